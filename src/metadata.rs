//! Feature metadata records and the persisted lookup document.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Descriptive fields about a genomic feature (gene, transcript, exon) as
/// reported by the annotation service. Every field defaults to empty so a
/// partially populated response is still a valid record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureMetadata", default)]
pub struct FeatureMetadata {
    #[serde(rename = "ID")]
    pub id: String,
    pub object_type: String,
    pub display_name: String,
    pub biotype: String,
    pub description: String,
    pub seq_region_name: String,
    pub is_canonical: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Set when the lookup failed; the record carries only `id`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unresolved: bool,
}

impl FeatureMetadata {
    /// Placeholder for an identifier the service could not answer for.
    #[must_use]
    pub fn unresolved(id: &str) -> Self {
        Self {
            id: id.to_string(),
            unresolved: true,
            ..Self::default()
        }
    }

    /// Parent identifier, if one is set and non-empty.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref().filter(|p| !p.is_empty())
    }

    /// Display name without a trailing isoform number (`TP53-201` → `TP53`).
    #[must_use]
    pub fn base_display_name(&self) -> &str {
        match self.display_name.rsplit_once('-') {
            Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
                head
            }
            _ => &self.display_name,
        }
    }
}

/// Anything that can hand out metadata for an unversioned identifier.
pub trait MetadataSource {
    fn metadata(&mut self, id: &str) -> Option<FeatureMetadata>;
}

/// Identifier → metadata map persisted by `build_lookup` and consumed by
/// `decode_peaks` and `append_references`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupDocument {
    entries: BTreeMap<String, FeatureMetadata>,
}

impl LookupDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn insert(&mut self, id: String, metadata: FeatureMetadata) {
        self.entries.insert(id, metadata);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FeatureMetadata> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FeatureMetadata)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataSource for LookupDocument {
    fn metadata(&mut self, id: &str) -> Option<FeatureMetadata> {
        self.entries.get(id).cloned()
    }
}

impl FromIterator<(String, FeatureMetadata)> for LookupDocument {
    fn from_iter<I: IntoIterator<Item = (String, FeatureMetadata)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> FeatureMetadata {
        FeatureMetadata {
            id: "ENST00000269305".to_string(),
            object_type: "Transcript".to_string(),
            display_name: "TP53-201".to_string(),
            biotype: "protein_coding".to_string(),
            description: String::new(),
            seq_region_name: "17".to_string(),
            is_canonical: true,
            parent: Some("ENSG00000141510".to_string()),
            unresolved: false,
        }
    }

    #[test]
    fn base_display_name_strips_isoform_number() {
        assert_eq!(transcript().base_display_name(), "TP53");
    }

    #[test]
    fn base_display_name_keeps_non_numeric_suffix() {
        let mut meta = transcript();
        meta.display_name = "HLA-DRB1".to_string();
        assert_eq!(meta.base_display_name(), "HLA-DRB1");
        meta.display_name = "MT-".to_string();
        assert_eq!(meta.base_display_name(), "MT-");
        meta.display_name = "GAPDH".to_string();
        assert_eq!(meta.base_display_name(), "GAPDH");
    }

    #[test]
    fn parent_id_ignores_empty() {
        let mut meta = transcript();
        assert_eq!(meta.parent_id(), Some("ENSG00000141510"));
        meta.parent = Some(String::new());
        assert_eq!(meta.parent_id(), None);
        meta.parent = None;
        assert_eq!(meta.parent_id(), None);
    }

    #[test]
    fn unresolved_placeholder() {
        let meta = FeatureMetadata::unresolved("ENSG00000000001");
        assert!(meta.unresolved);
        assert_eq!(meta.id, "ENSG00000000001");
        assert!(meta.display_name.is_empty());
    }

    #[test]
    fn serialized_form_is_tagged() {
        let json = serde_json::to_value(transcript()).unwrap();
        assert_eq!(json["type"], "FeatureMetadata");
        assert_eq!(json["ID"], "ENST00000269305");
        assert!(json.get("unresolved").is_none());
    }

    #[test]
    fn missing_fields_default() {
        let meta: FeatureMetadata =
            serde_json::from_str(r#"{"type": "FeatureMetadata", "ID": "ENSG1"}"#).unwrap();
        assert_eq!(meta.id, "ENSG1");
        assert!(!meta.is_canonical);
        assert!(meta.parent.is_none());
    }

    #[test]
    fn document_round_trip() {
        let doc: LookupDocument = [
            ("ENST00000269305".to_string(), transcript()),
            (
                "ENSG00000141510".to_string(),
                FeatureMetadata::unresolved("ENSG00000141510"),
            ),
        ]
        .into_iter()
        .collect();

        let mut buf = Vec::new();
        doc.write(&mut buf).unwrap();
        let back = LookupDocument::from_reader(buf.as_slice()).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn document_as_metadata_source() {
        let mut doc = LookupDocument::new();
        doc.insert("ENST00000269305".to_string(), transcript());
        assert!(doc.metadata("ENST00000269305").is_some());
        assert!(doc.metadata("ENST00000000000").is_none());
    }
}
