//! Peak, annotation and base-peak entities plus the persisted peak document.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::metadata::FeatureMetadata;
use crate::strand::Strand;

pub const DOCUMENT_FORMAT: &str = "eclipkit.peaks";
pub const DOCUMENT_VERSION: u32 = 1;

/// A genomic interval `[start, end)` on one strand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Peak")]
pub struct Peak {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub name: String,
    pub strand: Strand,
}

impl Peak {
    pub fn new(
        chrom: impl Into<String>,
        start: u64,
        end: u64,
        name: impl Into<String>,
        strand: Strand,
    ) -> Result<Self, Error> {
        if start > end {
            return Err(Error::Validation(format!(
                "peak start {start} is greater than end {end}"
            )));
        }
        Ok(Self {
            chrom: chrom.into(),
            start,
            end,
            name: name.into(),
            strand,
        })
    }

    /// Identity key across sources: two peaks are the same iff these match.
    #[must_use]
    pub fn position_string(&self) -> String {
        format!("{}:{}-{}", self.chrom, self.start, self.end)
    }
}

/// Strip everything from the first `.` onwards (`ENST00000269305.8` → `ENST00000269305`).
#[must_use]
pub fn unversioned(id: &str) -> &str {
    id.split_once('.').map_or(id, |(head, _)| head)
}

/// A feature overlapping a peak, on the same strand as that peak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Annotation")]
pub struct Annotation {
    pub location: Peak,
    pub feature_type: String,
    pub sub_type: String,
    pub info: Option<FeatureMetadata>,
}

impl Annotation {
    /// Aggregation key: the parent feature when the metadata names one,
    /// otherwise the annotated feature itself.
    #[must_use]
    pub fn gene_id(&self) -> &str {
        self.info
            .as_ref()
            .and_then(FeatureMetadata::parent_id)
            .unwrap_or(self.location.name.as_str())
    }
}

/// A called peak with every same-strand annotation attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "BasePeak")]
pub struct BasePeak {
    pub location: Peak,
    pub annotations: Vec<Annotation>,
}

impl BasePeak {
    #[must_use]
    pub fn position_string(&self) -> String {
        self.location.position_string()
    }
}

/// Hand-off artifact between decoding and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakDocument {
    pub format: String,
    pub version: u32,
    pub peaks: Vec<BasePeak>,
}

impl PeakDocument {
    #[must_use]
    pub fn new(peaks: Vec<BasePeak>) -> Self {
        Self {
            format: DOCUMENT_FORMAT.to_string(),
            version: DOCUMENT_VERSION,
            peaks,
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let doc: Self = serde_json::from_reader(reader)?;
        if doc.format != DOCUMENT_FORMAT {
            return Err(Error::Format(format!(
                "not a peak document: format is '{}', expected '{DOCUMENT_FORMAT}'",
                doc.format
            )));
        }
        if doc.version != DOCUMENT_VERSION {
            return Err(Error::Format(format!(
                "unsupported peak document version {}",
                doc.version
            )));
        }
        Ok(doc)
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exon(name: &str, parent: Option<&str>) -> Annotation {
        Annotation {
            location: Peak::new("chr17", 7_676_000, 7_676_600, name, Strand::Reverse).unwrap(),
            feature_type: "exon".to_string(),
            sub_type: "protein_coding".to_string(),
            info: parent.map(|p| FeatureMetadata {
                id: unversioned(name).to_string(),
                parent: Some(p.to_string()),
                ..FeatureMetadata::default()
            }),
        }
    }

    #[test]
    fn position_string_ignores_name() {
        let a = Peak::new("chr1", 10, 20, "peak_1", Strand::Forward).unwrap();
        let b = Peak::new("chr1", 10, 20, "peak_2", Strand::Forward).unwrap();
        assert_eq!(a.position_string(), "chr1:10-20");
        assert_eq!(a.position_string(), b.position_string());
    }

    #[test]
    fn start_after_end_rejected() {
        assert!(Peak::new("chr1", 20, 10, "p", Strand::Forward).is_err());
        assert!(Peak::new("chr1", 10, 10, "p", Strand::Forward).is_ok());
    }

    #[test]
    fn unversioned_strips_from_first_dot() {
        assert_eq!(unversioned("ENST00000269305.8"), "ENST00000269305");
        assert_eq!(unversioned("ENSG00000141510"), "ENSG00000141510");
        assert_eq!(unversioned("a.b.c"), "a");
    }

    #[test]
    fn gene_id_prefers_parent() {
        assert_eq!(
            exon("ENST00000269305.8", Some("ENSG00000141510")).gene_id(),
            "ENSG00000141510"
        );
        assert_eq!(exon("ENSG00000141510.17", None).gene_id(), "ENSG00000141510.17");
        assert_eq!(exon("ENST00000269305.8", Some("")).gene_id(), "ENST00000269305.8");
    }

    #[test]
    fn document_round_trip() {
        let peaks = vec![
            BasePeak {
                location: Peak::new("chr17", 7_676_100, 7_676_150, "peak_1", Strand::Reverse)
                    .unwrap(),
                annotations: vec![
                    exon("ENST00000269305.8", Some("ENSG00000141510")),
                    exon("ENSG00000141510.17", None),
                ],
            },
            BasePeak {
                location: Peak::new("chr1", 5, 9, "peak_2", Strand::Forward).unwrap(),
                annotations: Vec::new(),
            },
        ];
        let doc = PeakDocument::new(peaks);

        let mut buf = Vec::new();
        doc.write(&mut buf).unwrap();
        let first = PeakDocument::from_reader(buf.as_slice()).unwrap();
        assert_eq!(first, doc);

        let mut again = Vec::new();
        first.write(&mut again).unwrap();
        assert_eq!(PeakDocument::from_reader(again.as_slice()).unwrap(), doc);
    }

    #[test]
    fn serialized_entities_carry_type_tags() {
        let doc = PeakDocument::new(vec![BasePeak {
            location: Peak::new("chr1", 1, 2, "p", Strand::Forward).unwrap(),
            annotations: vec![exon("ENST00000269305.8", Some("ENSG00000141510"))],
        }]);
        let json = serde_json::to_value(&doc).unwrap();
        let peak = &json["peaks"][0];
        assert_eq!(peak["type"], "BasePeak");
        assert_eq!(peak["location"]["type"], "Peak");
        assert_eq!(peak["annotations"][0]["type"], "Annotation");
        assert_eq!(peak["annotations"][0]["info"]["type"], "FeatureMetadata");
    }

    #[test]
    fn wrong_format_rejected() {
        let json = r#"{"format": "something.else", "version": 1, "peaks": []}"#;
        let err = PeakDocument::from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }
}
