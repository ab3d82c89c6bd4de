//! Feature metadata resolution with one level of parent inheritance.
//!
//! The resolver owns a per-run cache keyed by the raw identifier. Every
//! identifier (including parents reached through inheritance) is sent to the
//! backing service at most once per run, whether it was resolved directly or
//! fetched by [`MetadataResolver::prefetch`].

use std::collections::{BTreeSet, HashMap};

use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::error::Error;
use crate::metadata::{FeatureMetadata, LookupDocument};
use crate::peak::unversioned;
use crate::service::{FeatureLookup, LookupRecord};

pub struct MetadataResolver<L> {
    lookup: L,
    /// Raw identifier → lookup outcome; `None` records a failed lookup.
    records: HashMap<String, Option<LookupRecord>>,
}

impl<L: FeatureLookup> MetadataResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            records: HashMap::new(),
        }
    }

    /// Metadata for `id`, never failing. When `follow_parent` is set, an
    /// empty description or display name is filled from the parent feature
    /// (one level only).
    pub fn resolve(&mut self, id: &str, follow_parent: bool) -> FeatureMetadata {
        let Some(record) = self.fetch(id) else {
            return FeatureMetadata::unresolved(id);
        };
        let mut metadata = record.to_metadata(id);

        let has_gap = metadata.description.is_empty() || metadata.display_name.is_empty();
        if follow_parent && has_gap {
            if let Some(parent_id) = metadata.parent_id().map(str::to_string) {
                let parent = self.resolve(&parent_id, false);
                if metadata.description.is_empty() {
                    metadata.description = parent.description;
                }
                if metadata.display_name.is_empty() {
                    metadata.display_name = parent.display_name;
                }
            }
        }
        metadata
    }

    fn fetch(&mut self, id: &str) -> Option<&LookupRecord> {
        if !self.records.contains_key(id) {
            let outcome = fetch_one(&self.lookup, id);
            self.records.insert(id.to_string(), outcome);
        }
        self.records.get(id).and_then(Option::as_ref)
    }

    /// Every identifier seen so far, parents included, resolved with
    /// inheritance. Answered from the cache after a [`Self::prefetch`], so
    /// gene-level keys produced by the indexer are part of the document.
    pub fn into_document(mut self) -> LookupDocument {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort();
        ids.into_iter()
            .map(|id| {
                let metadata = self.resolve(&id, true);
                (id, metadata)
            })
            .collect()
    }
}

impl<L: FeatureLookup + Sync> MetadataResolver<L> {
    /// Look up every identifier not yet cached, plus their parents, on a
    /// pool of at most `threads` workers. Identifiers are deduplicated
    /// before dispatch. Returns the number of outbound lookups issued.
    pub fn prefetch<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a str>,
        threads: usize,
        progress: &ProgressBar,
    ) -> Result<usize, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build()
            .map_err(|e| Error::InvalidInput(format!("cannot start lookup pool: {e}")))?;

        let mut pending: BTreeSet<String> = ids
            .into_iter()
            .filter(|id| !self.records.contains_key(*id))
            .map(str::to_string)
            .collect();
        let mut issued = 0;

        // Two waves: the identifiers themselves, then parents discovered in their records.
        for _ in 0..2 {
            if pending.is_empty() {
                break;
            }
            progress.inc_length(pending.len() as u64);
            let lookup = &self.lookup;
            let fetched: Vec<(String, Option<LookupRecord>)> = pool.install(|| {
                pending
                    .par_iter()
                    .map(|id| {
                        let outcome = fetch_one(lookup, id);
                        progress.inc(1);
                        (id.clone(), outcome)
                    })
                    .collect()
            });
            issued += fetched.len();

            let parents: BTreeSet<String> = fetched
                .iter()
                .filter_map(|(_, record)| record.as_ref()?.parent.clone())
                .filter(|p| !p.is_empty())
                .collect();
            self.records.extend(fetched);
            pending = parents
                .into_iter()
                .filter(|p| !self.records.contains_key(p))
                .collect();
        }
        Ok(issued)
    }
}

fn fetch_one<L: FeatureLookup + ?Sized>(lookup: &L, id: &str) -> Option<LookupRecord> {
    match lookup.lookup(unversioned(id)) {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("no metadata for {id}: {e}");
            None
        }
    }
}
