//! Sequence records returned by the annotation service and a per-run cache of them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::service::{SequenceKind, SequenceLookup};

/// Body of a `/sequence/id` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceRecord {
    pub id: String,
    pub query: String,
    pub molecule: String,
    pub version: i64,
    /// `coord_system:assembly:region:start:end:strand`.
    pub desc: String,
    pub seq: String,
}

/// Sequence dictionary keyed by identifier and sequence kind, filled on demand.
pub struct SequenceCache<S> {
    source: S,
    sequences: HashMap<(String, SequenceKind), SequenceRecord>,
}

impl<S: SequenceLookup> SequenceCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            sequences: HashMap::new(),
        }
    }

    /// Fetch once per `(id, kind)`; failures are not cached so a later call may retry.
    pub fn get(&mut self, id: &str, kind: SequenceKind) -> Result<&SequenceRecord, Error> {
        let key = (id.to_string(), kind);
        if !self.sequences.contains_key(&key) {
            let record = self.source.sequence(id, kind)?;
            self.sequences.insert(key.clone(), record);
        }
        self.sequences
            .get(&key)
            .ok_or_else(|| Error::Lookup(format!("sequence for {id} missing from cache")))
    }
}
