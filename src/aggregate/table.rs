//! Tab-separated form of the scored table.
//!
//! Columns: `ID`, `strand`, `peaks-<label>`…, `peak-union`, `count-<label>`…,
//! `count-union`, `union-max-diff`. Peak sets are written as sorted JSON
//! string arrays.

use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::Error;
use crate::strand::Strand;

use super::score::{ScoredRow, ScoredTable};

pub const ID_COLUMN: &str = "ID";
pub const STRAND_COLUMN: &str = "strand";
pub const UNION_COLUMN: &str = "peak-union";
pub const COUNT_UNION_COLUMN: &str = "count-union";
pub const SCORE_COLUMN: &str = "union-max-diff";
const PEAKS_PREFIX: &str = "peaks-";
const COUNT_PREFIX: &str = "count-";

/// Source label of an input file: its file name.
#[must_use]
pub fn label_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[must_use]
pub fn header(labels: &[String]) -> Vec<String> {
    let mut columns = vec![ID_COLUMN.to_string(), STRAND_COLUMN.to_string()];
    columns.extend(labels.iter().map(|l| format!("{PEAKS_PREFIX}{l}")));
    columns.push(UNION_COLUMN.to_string());
    columns.extend(labels.iter().map(|l| format!("{COUNT_PREFIX}{l}")));
    columns.push(COUNT_UNION_COLUMN.to_string());
    columns.push(SCORE_COLUMN.to_string());
    columns
}

/// Tab-separated writer with quoting disabled; JSON cells never contain tabs.
pub fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer)
}

/// Tab-separated reader expecting a header row.
pub fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(reader)
}

pub fn write_table<W: Write>(table: &ScoredTable, writer: W) -> Result<(), Error> {
    let mut out = tsv_writer(writer);
    out.write_record(header(&table.labels))?;
    for row in &table.rows {
        let mut cells = vec![row.gene_id.clone(), row.strand.to_string()];
        for set in &row.per_source {
            cells.push(serde_json::to_string(set)?);
        }
        cells.push(serde_json::to_string(&row.union)?);
        cells.extend(row.counts.iter().map(usize::to_string));
        cells.push(row.count_union.to_string());
        cells.push(row.union_max_diff.to_string());
        out.write_record(&cells)?;
    }
    out.flush()?;
    Ok(())
}

/// Parse a table written by [`write_table`].
pub fn read_table<R: Read>(reader: R) -> Result<ScoredTable, Error> {
    let mut input = tsv_reader(reader);
    let columns = input.headers()?.clone();
    let labels: Vec<String> = columns
        .iter()
        .filter_map(|c| c.strip_prefix(PEAKS_PREFIX))
        .map(str::to_string)
        .collect();
    if columns.len() != header(&labels).len()
        || columns.get(0) != Some(ID_COLUMN)
        || columns.get(1) != Some(STRAND_COLUMN)
    {
        return Err(Error::Format(format!(
            "unexpected aggregated table header: {}",
            columns.iter().collect::<Vec<_>>().join(", ")
        )));
    }

    let n = labels.len();
    let mut rows = Vec::new();
    for result in input.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let cell = |i: usize| {
            record.get(i).ok_or_else(|| Error::MalformedRecord {
                line,
                reason: format!("missing column {i}"),
            })
        };
        let set = |i: usize| -> Result<BTreeSet<String>, Error> {
            serde_json::from_str(cell(i)?).map_err(|e| Error::MalformedRecord {
                line,
                reason: format!("column {i}: {e}"),
            })
        };
        let count = |i: usize| -> Result<usize, Error> {
            cell(i)?.parse::<usize>().map_err(|e| Error::MalformedRecord {
                line,
                reason: format!("column {i}: {e}"),
            })
        };
        let diff = |i: usize| -> Result<i64, Error> {
            cell(i)?.parse::<i64>().map_err(|e| Error::MalformedRecord {
                line,
                reason: format!("column {i}: {e}"),
            })
        };

        let per_source = (0..n).map(|k| set(2 + k)).collect::<Result<Vec<_>, _>>()?;
        let counts = (0..n).map(|k| count(3 + n + k)).collect::<Result<Vec<_>, _>>()?;
        rows.push(ScoredRow {
            gene_id: cell(0)?.to_string(),
            strand: cell(1)?.parse::<Strand>()?,
            per_source,
            union: set(2 + n)?,
            counts,
            count_union: count(3 + 2 * n)?,
            union_max_diff: diff(4 + 2 * n)?,
        });
    }
    Ok(ScoredTable { labels, rows })
}
