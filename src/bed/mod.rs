//! Annotated peak file decoder: intersected eCLIP BED rows → base peaks.

pub mod layout;
pub mod parser;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::StringRecord;
use flate2::read::MultiGzDecoder;

use crate::error::Error;
use crate::metadata::MetadataSource;
use crate::peak::BasePeak;

use layout::RecordLayout;
use parser::{DecodedRow, decode_record};

/// Row counts gathered while decoding one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub rows: usize,
    pub peaks: usize,
    pub unknown: usize,
    pub malformed: usize,
    pub annotations: usize,
}

/// Open a plain or gzip-compressed (`.gz`) input file.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>, Error> {
    let file = File::open(path).map_err(|e| {
        Error::InvalidInput(format!("cannot open {}: {e}", path.display()))
    })?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Decode every row of an annotated peak table.
///
/// The layout is checked against the first readable row before anything is
/// decoded. Rows that do not fit, including rows that are not valid UTF-8,
/// are skipped with a warning.
pub fn decode_reader<R: Read, M: MetadataSource + ?Sized>(
    reader: R,
    layout: &RecordLayout,
    metadata: &mut M,
) -> Result<(Vec<BasePeak>, DecodeSummary), Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut peaks = Vec::new();
    let mut summary = DecodeSummary::default();

    let mut validated = false;
    for (index, result) in csv_reader.byte_records().enumerate() {
        let raw = result?;
        let line = raw.position().map_or(index as u64 + 1, |pos| pos.line());
        summary.rows += 1;

        let decoded = StringRecord::from_byte_record(raw)
            .map_err(|e| Error::MalformedRecord {
                line,
                reason: format!("not valid UTF-8: {}", e.utf8_error()),
            })
            .and_then(|record| {
                if !validated {
                    layout.validate(&record)?;
                    validated = true;
                }
                decode_record(&record, line, layout, metadata)
            });

        match decoded {
            Ok(DecodedRow::Peak(peak)) => {
                summary.peaks += 1;
                summary.annotations += peak.annotations.len();
                peaks.push(peak);
            }
            Ok(DecodedRow::Unknown) => summary.unknown += 1,
            Err(e @ Error::MalformedRecord { .. }) => {
                log::warn!("skipping row: {e}");
                summary.malformed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok((peaks, summary))
}

/// Decode an annotated peak file from disk.
pub fn decode_file<M: MetadataSource + ?Sized>(
    path: &Path,
    layout: &RecordLayout,
    metadata: &mut M,
) -> Result<(Vec<BasePeak>, DecodeSummary), Error> {
    let reader = open_input(path)?;
    decode_reader(reader, layout, metadata).map_err(|e| match e {
        Error::Format(msg) => Error::Format(format!("{}: {msg}", path.display())),
        other => other,
    })
}
