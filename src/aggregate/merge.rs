//! Full outer join of per-source gene indices.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Error;
use crate::strand::Strand;

use super::index::GeneIndex;

/// One gene across every source. `per_source` follows the table's label order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRow {
    pub strand: Strand,
    pub per_source: Vec<BTreeSet<String>>,
    pub union: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedTable {
    pub labels: Vec<String>,
    pub rows: BTreeMap<String, AggregatedRow>,
}

/// Merge labelled indices; a gene missing from a source gets an empty set there.
///
/// When sources disagree on a gene's strand, the first source (in input
/// order) that lists the gene wins.
pub fn merge(sources: Vec<(String, GeneIndex)>) -> Result<AggregatedTable, Error> {
    if sources.is_empty() {
        return Err(Error::InvalidInput(
            "at least one source is required for aggregation".to_string(),
        ));
    }
    let width = sources.len();
    let mut labels = Vec::with_capacity(width);
    let mut rows: BTreeMap<String, AggregatedRow> = BTreeMap::new();

    for (column, (label, index)) in sources.into_iter().enumerate() {
        labels.push(label);
        for (gene, record) in index {
            let row = rows.entry(gene).or_insert_with(|| AggregatedRow {
                strand: record.strand,
                per_source: vec![BTreeSet::new(); width],
                union: BTreeSet::new(),
            });
            row.union.extend(record.peaks.iter().cloned());
            row.per_source[column] = record.peaks;
        }
    }

    Ok(AggregatedTable { labels, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::index::GeneRecord;

    fn index(entries: &[(&str, &[&str])]) -> GeneIndex {
        entries
            .iter()
            .map(|(gene, peaks)| {
                (
                    gene.to_string(),
                    GeneRecord {
                        strand: Strand::Forward,
                        peaks: peaks.iter().map(|p| p.to_string()).collect(),
                    },
                )
            })
            .collect()
    }

    fn source_set<'t>(
        table: &'t AggregatedTable,
        gene: &str,
        label: &str,
    ) -> &'t BTreeSet<String> {
        let column = table.labels.iter().position(|l| l == label).unwrap();
        &table.rows[gene].per_source[column]
    }

    fn sources() -> Vec<(String, GeneIndex)> {
        vec![
            (
                "a".to_string(),
                index(&[("G1", &["chr1:10-20"]), ("G2", &["chr2:1-5"])]),
            ),
            (
                "b".to_string(),
                index(&[("G1", &["chr1:10-20", "chr1:50-60"])]),
            ),
            ("c".to_string(), index(&[("G3", &["chr3:7-9"])])),
        ]
    }

    #[test]
    fn zero_sources_rejected() {
        assert!(matches!(merge(Vec::new()), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn outer_join_with_empty_sets() {
        let table = merge(sources()).unwrap();
        assert_eq!(table.labels, ["a", "b", "c"]);
        assert_eq!(table.rows.len(), 3);
        assert!(source_set(&table, "G2", "b").is_empty());
        assert!(source_set(&table, "G3", "a").is_empty());
        assert_eq!(table.rows["G1"].union.len(), 2);
    }

    #[test]
    fn union_contains_every_source() {
        let table = merge(sources()).unwrap();
        for row in table.rows.values() {
            for set in &row.per_source {
                assert!(set.is_subset(&row.union));
            }
        }
    }

    #[test]
    fn order_independent() {
        let forward = merge(sources()).unwrap();
        let mut reversed = sources();
        reversed.rotate_left(2);
        let rotated = merge(reversed).unwrap();

        assert_eq!(
            forward.rows.keys().collect::<Vec<_>>(),
            rotated.rows.keys().collect::<Vec<_>>()
        );
        for (gene, row) in &forward.rows {
            assert_eq!(row.union, rotated.rows[gene].union);
            for label in &forward.labels {
                assert_eq!(
                    source_set(&forward, gene, label),
                    source_set(&rotated, gene, label)
                );
            }
        }
    }

    #[test]
    fn first_source_strand_wins() {
        let mut sources = sources();
        sources[1].1.get_mut("G1").unwrap().strand = Strand::Reverse;
        let table = merge(sources).unwrap();
        assert_eq!(table.rows["G1"].strand, Strand::Forward);
    }
}
