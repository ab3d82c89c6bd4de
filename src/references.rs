//! Append gene aliases and lookup metadata to an aggregated table.

use std::collections::HashMap;
use std::io::{Read, Write};

use crate::aggregate::table::{tsv_reader, tsv_writer};
use crate::error::Error;
use crate::metadata::LookupDocument;
use crate::peak::unversioned;
use crate::service::SynonymLookup;

/// Columns appended after the aggregated ones, in order.
pub const REFERENCE_COLUMNS: [&str; 9] = [
    "aliases",
    "object_type",
    "display_name",
    "gene_name",
    "biotype",
    "description",
    "seq_region_name",
    "parent",
    "is_canonical",
];

/// Per-run synonym cache in front of a [`SynonymLookup`].
pub struct AliasCache<S> {
    source: S,
    aliases: HashMap<String, Vec<String>>,
}

impl<S: SynonymLookup> AliasCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            aliases: HashMap::new(),
        }
    }

    /// Synonyms of `id`; a failed lookup is logged and cached as no aliases.
    pub fn aliases(&mut self, id: &str) -> &[String] {
        self.aliases.entry(id.to_string()).or_insert_with(|| {
            match self.source.synonyms(unversioned(id)) {
                Ok(mut synonyms) => {
                    synonyms.sort();
                    synonyms.dedup();
                    synonyms
                }
                Err(e) => {
                    log::warn!("no aliases for {id}: {e}");
                    Vec::new()
                }
            }
        })
    }
}

/// Copy the table from `input` to `output` with [`REFERENCE_COLUMNS`]
/// appended. Returns the number of data rows written.
///
/// Row ids that kept their version suffix (genes keyed by a feature's own
/// name) are looked up unversioned when the exact id is absent.
pub fn append_references<R: Read, W: Write, S: SynonymLookup>(
    input: R,
    output: W,
    lookup: &LookupDocument,
    aliases: &mut AliasCache<S>,
) -> Result<usize, Error> {
    let mut reader = tsv_reader(input);
    let mut writer = tsv_writer(output);

    let mut header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(Error::Format("aggregated table has no header".to_string()));
    }
    for column in REFERENCE_COLUMNS {
        header.push_field(column);
    }
    writer.write_record(&header)?;

    let mut rows = 0;
    for result in reader.records() {
        let mut record = result?;
        let gene = record.get(0).unwrap_or_default().to_string();
        record.push_field(&serde_json::to_string(aliases.aliases(&gene))?);

        match lookup.get(&gene).or_else(|| lookup.get(unversioned(&gene))) {
            Some(meta) => {
                record.push_field(&meta.object_type);
                record.push_field(&meta.display_name);
                record.push_field(meta.base_display_name());
                record.push_field(&meta.biotype);
                record.push_field(&meta.description);
                record.push_field(&meta.seq_region_name);
                record.push_field(meta.parent.as_deref().unwrap_or_default());
                record.push_field(if meta.is_canonical { "true" } else { "false" });
            }
            None => {
                for _ in 1..REFERENCE_COLUMNS.len() {
                    record.push_field("");
                }
            }
        }
        writer.write_record(&record)?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}
