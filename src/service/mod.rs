//! Annotation service seams: lookup, cross-reference and sequence endpoints.
//!
//! The pipeline only ever talks to these traits; [`ensembl::EnsemblClient`]
//! is the production implementation and tests substitute in-memory fakes.

pub mod ensembl;
pub mod retry;

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;
use crate::metadata::FeatureMetadata;
use crate::sequence::SequenceRecord;

/// Raw body of a `/lookup/id` response. Ensembl omits fields freely.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LookupRecord {
    pub object_type: Option<String>,
    pub display_name: Option<String>,
    pub biotype: Option<String>,
    pub description: Option<String>,
    pub seq_region_name: Option<String>,
    #[serde(rename = "Parent")]
    pub parent: Option<String>,
    /// `1`/`0` on Ensembl, occasionally a boolean.
    pub is_canonical: Option<Value>,
}

impl LookupRecord {
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        match &self.is_canonical {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
            Some(Value::String(s)) => matches!(s.as_str(), "1" | "true"),
            _ => false,
        }
    }

    /// Fixed-shape metadata for `id` with no inherited fields filled in.
    #[must_use]
    pub fn to_metadata(&self, id: &str) -> FeatureMetadata {
        FeatureMetadata {
            id: id.to_string(),
            object_type: self.object_type.clone().unwrap_or_default(),
            display_name: self.display_name.clone().unwrap_or_default(),
            biotype: self.biotype.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            seq_region_name: self.seq_region_name.clone().unwrap_or_default(),
            is_canonical: self.is_canonical(),
            parent: self.parent.clone(),
            unresolved: false,
        }
    }
}

/// Which sequence the `/sequence/id` endpoint should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    Genomic,
    Cds,
}

impl SequenceKind {
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Genomic => "genomic",
            Self::Cds => "cds",
        }
    }
}

/// Lookup of one (unversioned) identifier.
pub trait FeatureLookup {
    fn lookup(&self, id: &str) -> Result<LookupRecord, Error>;
}

/// Alternative names for an identifier.
pub trait SynonymLookup {
    fn synonyms(&self, id: &str) -> Result<Vec<String>, Error>;
}

pub trait SequenceLookup {
    fn sequence(&self, id: &str, kind: SequenceKind) -> Result<SequenceRecord, Error>;
}
