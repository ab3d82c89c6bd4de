//! Decode one annotated peak row into a [`BasePeak`].

use csv::StringRecord;

use crate::error::Error;
use crate::metadata::MetadataSource;
use crate::peak::{Annotation, BasePeak, Peak, unversioned};
use crate::strand::Strand;

use super::layout::{AnnotationBlock, RecordLayout};

/// Result of decoding a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedRow {
    Peak(BasePeak),
    /// The validity flag marked the row as unannotated.
    Unknown,
}

/// Decode `record`. Annotation blocks on the other strand than the peak are
/// dropped; metadata is attached by the block's unversioned feature name.
pub fn decode_record<M: MetadataSource + ?Sized>(
    record: &StringRecord,
    line: u64,
    layout: &RecordLayout,
    metadata: &mut M,
) -> Result<DecodedRow, Error> {
    let malformed = |reason: String| Error::MalformedRecord { line, reason };

    if record.len() < layout.min_columns() {
        return Err(malformed(format!(
            "{} columns, expected at least {}",
            record.len(),
            layout.min_columns()
        )));
    }
    if layout.is_unknown(record) {
        return Ok(DecodedRow::Unknown);
    }

    let cell = |i: usize| record.get(i).unwrap_or_default();
    let base_strand = cell(layout.strand);
    let location = parse_peak(
        cell(layout.chrom),
        cell(layout.start),
        cell(layout.end),
        cell(layout.name),
        base_strand,
    )
    .map_err(|e| malformed(e.to_string()))?;

    let mut annotations = Vec::new();
    for block in layout.blocks(record) {
        if block.is_empty() || block.strand != base_strand {
            continue;
        }
        let annotation = parse_block(&block, metadata)
            .map_err(|e| malformed(format!("block at column {}: {e}", block.column)))?;
        annotations.push(annotation);
    }

    Ok(DecodedRow::Peak(BasePeak {
        location,
        annotations,
    }))
}

fn parse_block<M: MetadataSource + ?Sized>(
    block: &AnnotationBlock<'_>,
    metadata: &mut M,
) -> Result<Annotation, Error> {
    let location = parse_peak(block.chrom, block.start, block.end, block.name, block.strand)?;
    let info = metadata.metadata(unversioned(block.name));
    Ok(Annotation {
        location,
        feature_type: block.feature_type.to_string(),
        sub_type: block.sub_type.to_string(),
        info,
    })
}

fn parse_peak(
    chrom: &str,
    start: &str,
    end: &str,
    name: &str,
    strand: &str,
) -> Result<Peak, Error> {
    let coordinate = |s: &str| {
        s.trim()
            .parse::<u64>()
            .map_err(|e| Error::Parse(format!("invalid coordinate '{s}': {e}")))
    };
    let strand: Strand = strand.parse()?;
    Peak::new(chrom, coordinate(start)?, coordinate(end)?, name, strand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FeatureMetadata, LookupDocument};

    const BASE: [&str; 10] = [
        "chr17", "7676100", "7676150", "peak_1", "1000", "-", "4.2", "6.1", "-1", "-1",
    ];

    fn row(blocks: &[[&str; 7]]) -> StringRecord {
        let mut cells: Vec<&str> = BASE.to_vec();
        for block in blocks {
            cells.extend_from_slice(block);
        }
        StringRecord::from(cells)
    }

    fn lookup() -> LookupDocument {
        let mut doc = LookupDocument::new();
        doc.insert(
            "ENST00000269305".to_string(),
            FeatureMetadata {
                id: "ENST00000269305".to_string(),
                parent: Some("ENSG00000141510".to_string()),
                ..FeatureMetadata::default()
            },
        );
        doc
    }

    fn decode(record: &StringRecord) -> Result<DecodedRow, Error> {
        decode_record(record, 1, &RecordLayout::ECLIP, &mut lookup())
    }

    fn peak(record: &StringRecord) -> BasePeak {
        match decode(record).unwrap() {
            DecodedRow::Peak(peak) => peak,
            DecodedRow::Unknown => panic!("row decoded as unknown"),
        }
    }

    const EXON: [&str; 7] = [
        "chr17",
        "7676000",
        "7676600",
        "-",
        "ENST00000269305.8",
        "exon",
        "protein_coding",
    ];
    const GENE: [&str; 7] = [
        "chr17",
        "7661779",
        "7687538",
        "-",
        "ENSG00000141510.17",
        "gene",
        "protein_coding",
    ];
    const ANTISENSE: [&str; 7] = [
        "chr17",
        "7675000",
        "7677000",
        "+",
        "ENSG00000234327.1",
        "gene",
        "lncRNA",
    ];

    #[test]
    fn unknown_row_yields_nothing() {
        let mut cells: Vec<&str> = BASE.to_vec();
        cells.extend(["UNKNOWN", "-1", "-1", ".", ".", ".", "."]);
        assert_eq!(decode(&StringRecord::from(cells)).unwrap(), DecodedRow::Unknown);
    }

    #[test]
    fn base_peak_columns() {
        let p = peak(&row(&[EXON]));
        assert_eq!(p.location.chrom, "chr17");
        assert_eq!(p.location.start, 7_676_100);
        assert_eq!(p.location.end, 7_676_150);
        assert_eq!(p.location.name, "peak_1");
        assert_eq!(p.location.strand, Strand::Reverse);
    }

    #[test]
    fn annotations_in_block_order_with_metadata() {
        let p = peak(&row(&[EXON, GENE]));
        assert_eq!(p.annotations.len(), 2);
        let exon = &p.annotations[0];
        assert_eq!(exon.location.name, "ENST00000269305.8");
        assert_eq!(exon.feature_type, "exon");
        assert_eq!(exon.sub_type, "protein_coding");
        assert_eq!(
            exon.info.as_ref().and_then(FeatureMetadata::parent_id),
            Some("ENSG00000141510")
        );
        assert!(p.annotations[1].info.is_none());
    }

    #[test]
    fn opposite_strand_blocks_excluded() {
        let p = peak(&row(&[ANTISENSE, EXON, ANTISENSE]));
        assert_eq!(p.annotations.len(), 1);
        assert_eq!(p.annotations[0].location.name, "ENST00000269305.8");
    }

    #[test]
    fn only_opposite_strand_gives_empty_annotations() {
        let p = peak(&row(&[ANTISENSE]));
        assert!(p.annotations.is_empty());
    }

    #[test]
    fn padded_blocks_skipped() {
        let mut record = row(&[EXON]);
        for _ in 0..7 {
            record.push_field("");
        }
        let p = peak(&record);
        assert_eq!(p.annotations.len(), 1);
    }

    #[test]
    fn row_without_flag_is_unannotated_peak() {
        let p = peak(&StringRecord::from(BASE.to_vec()));
        assert_eq!(p.location.name, "peak_1");
        assert!(p.annotations.is_empty());
    }

    #[test]
    fn short_row_is_malformed() {
        let record = StringRecord::from(BASE[..4].to_vec());
        assert!(matches!(decode(&record), Err(Error::MalformedRecord { line: 1, .. })));
    }

    #[test]
    fn bad_coordinate_is_malformed() {
        let mut cells: Vec<&str> = BASE.to_vec();
        cells[1] = "abc";
        cells.extend(EXON);
        assert!(matches!(
            decode(&StringRecord::from(cells)),
            Err(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn bad_block_coordinate_is_malformed() {
        let mut bad = EXON;
        bad[2] = "end";
        let err = decode(&row(&[bad])).unwrap_err();
        assert!(err.to_string().contains("block at column 10"));
    }
}
