//! Extract the sequence under a peak from a gene's genomic sequence.

use std::str::FromStr;

use crate::error::Error;
use crate::sequence::SequenceRecord;
use crate::strand::Strand;

/// Genomic placement parsed from a sequence record's `desc`,
/// e.g. `chromosome:GRCh38:3:193593144:193697811:1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRegion {
    pub coord_system: String,
    pub assembly: String,
    pub region: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl FromStr for SequenceRegion {
    type Err = Error;

    fn from_str(desc: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = desc.split(':').collect();
        if fields.len() != 6 {
            return Err(Error::Parse(format!(
                "sequence description has {} fields, expected 6: '{desc}'",
                fields.len()
            )));
        }
        let coordinate = |s: &str| {
            s.parse::<u64>()
                .map_err(|e| Error::Parse(format!("invalid coordinate '{s}' in '{desc}': {e}")))
        };
        let strand = match fields[5] {
            "1" | "+" => Strand::Forward,
            "-1" | "-" => Strand::Reverse,
            other => {
                return Err(Error::Parse(format!(
                    "strand has to be 1/+ or -1/-, got '{other}'"
                )));
            }
        };
        Ok(Self {
            coord_system: fields[0].to_string(),
            assembly: fields[1].to_string(),
            region: fields[2].to_string(),
            start: coordinate(fields[3])?,
            end: coordinate(fields[4])?,
            strand,
        })
    }
}

/// A sub-sequence cut from a record, with how much of the request fell outside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClippedSequence {
    pub sequence: String,
    pub clipped_start: u64,
    pub clipped_end: u64,
}

impl ClippedSequence {
    #[must_use]
    pub fn was_clipped(&self) -> bool {
        self.clipped_start > 0 || self.clipped_end > 0
    }
}

/// Sequence of `[start, end)` (genomic coordinates) within `record`.
///
/// Requests reaching past either end of the record are truncated to the
/// available sequence and reported as a warning; this never fails on range.
pub fn binding_sequence(
    record: &SequenceRecord,
    start: u64,
    end: u64,
) -> Result<ClippedSequence, Error> {
    if start > end {
        return Err(Error::Validation(format!(
            "binding site start {start} is greater than end {end}"
        )));
    }
    let region: SequenceRegion = record.desc.parse()?;
    let seq_len = record.seq.len() as u64;

    let requested_start = start as i128 - region.start as i128;
    let requested_end = requested_start + (end - start) as i128;

    let clipped_start = if requested_start < 0 {
        let clipped = requested_start.unsigned_abs() as u64;
        log::warn!("{}: sequence got clipped by {clipped} at the start", record.id);
        clipped
    } else {
        0
    };
    let clipped_end = if requested_end > seq_len as i128 {
        let clipped = (requested_end - seq_len as i128) as u64;
        log::warn!("{}: sequence got clipped by {clipped} at the end", record.id);
        clipped
    } else {
        0
    };

    let from = requested_start.clamp(0, seq_len as i128) as usize;
    let to = requested_end.clamp(from as i128, seq_len as i128) as usize;
    let sequence = record
        .seq
        .get(from..to)
        .ok_or_else(|| Error::Format(format!("{}: sequence is not ASCII", record.id)))?
        .to_string();

    Ok(ClippedSequence {
        sequence,
        clipped_start,
        clipped_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(desc: &str, seq: &str) -> SequenceRecord {
        SequenceRecord {
            id: "ENSG00000198836".to_string(),
            desc: desc.to_string(),
            seq: seq.to_string(),
            ..SequenceRecord::default()
        }
    }

    #[test]
    fn parse_region() {
        let region: SequenceRegion = "chromosome:GRCh38:3:193593144:193697811:1".parse().unwrap();
        assert_eq!(region.region, "3");
        assert_eq!(region.start, 193_593_144);
        assert_eq!(region.end, 193_697_811);
        assert_eq!(region.strand, Strand::Forward);

        let region: SequenceRegion = "chromosome:GRCh38:X:10:20:-1".parse().unwrap();
        assert_eq!(region.strand, Strand::Reverse);
    }

    #[test]
    fn parse_region_rejects_bad_strand() {
        let err = "chromosome:GRCh38:3:1:2:0".parse::<SequenceRegion>().unwrap_err();
        assert!(err.to_string().contains("strand"));
    }

    #[test]
    fn parse_region_rejects_short_desc() {
        assert!("chromosome:GRCh38:3".parse::<SequenceRegion>().is_err());
        assert!("chromosome:GRCh38:3:a:2:1".parse::<SequenceRegion>().is_err());
    }

    #[test]
    fn inside_range() {
        let rec = record("chromosome:GRCh38:1:100:109:1", "ACGTACGTAC");
        let cut = binding_sequence(&rec, 102, 106).unwrap();
        assert_eq!(cut.sequence, "GTAC");
        assert!(!cut.was_clipped());
    }

    #[test]
    fn end_past_sequence_is_truncated() {
        let rec = record("chromosome:GRCh38:1:100:109:1", "ACGTACGTAC");
        let cut = binding_sequence(&rec, 106, 115).unwrap();
        assert_eq!(cut.sequence, "GTAC");
        assert_eq!(cut.clipped_end, 5);
        assert_eq!(cut.clipped_start, 0);
        assert!(cut.was_clipped());
    }

    #[test]
    fn start_before_sequence_is_truncated() {
        let rec = record("chromosome:GRCh38:1:100:109:1", "ACGTACGTAC");
        let cut = binding_sequence(&rec, 97, 103).unwrap();
        assert_eq!(cut.sequence, "ACG");
        assert_eq!(cut.clipped_start, 3);
        assert_eq!(cut.clipped_end, 0);
    }

    #[test]
    fn range_entirely_outside_is_empty() {
        let rec = record("chromosome:GRCh38:1:100:109:1", "ACGTACGTAC");
        let cut = binding_sequence(&rec, 200, 210).unwrap();
        assert!(cut.sequence.is_empty());
        assert!(cut.was_clipped());
    }

    #[test]
    fn inverted_range_rejected() {
        let rec = record("chromosome:GRCh38:1:100:109:1", "ACGTACGTAC");
        assert!(binding_sequence(&rec, 105, 101).is_err());
    }
}
