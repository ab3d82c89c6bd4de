//! Consistency scoring and ranking of the aggregated table.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::strand::Strand;

use super::merge::AggregatedTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredRow {
    pub gene_id: String,
    pub strand: Strand,
    pub per_source: Vec<BTreeSet<String>>,
    pub union: BTreeSet<String>,
    pub counts: Vec<usize>,
    pub count_union: usize,
    pub union_max_diff: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredTable {
    pub labels: Vec<String>,
    pub rows: Vec<ScoredRow>,
}

/// `count_union − (max − min)` over the per-source counts.
#[must_use]
pub fn union_max_diff(counts: &[usize], count_union: usize) -> i64 {
    let max = counts.iter().copied().max().unwrap_or(0);
    let min = counts.iter().copied().min().unwrap_or(0);
    count_union as i64 - (max - min) as i64
}

/// Count every set, then rank rows by `(union_max_diff, count_union)`
/// descending. Ties keep gene-id order.
#[must_use]
pub fn score(table: AggregatedTable) -> ScoredTable {
    let mut rows: Vec<ScoredRow> = table
        .rows
        .into_iter()
        .map(|(gene_id, row)| {
            let counts: Vec<usize> = row.per_source.iter().map(BTreeSet::len).collect();
            let count_union = row.union.len();
            ScoredRow {
                union_max_diff: union_max_diff(&counts, count_union),
                gene_id,
                strand: row.strand,
                per_source: row.per_source,
                union: row.union,
                counts,
                count_union,
            }
        })
        .collect();

    rows.sort_by_key(|row| Reverse((row.union_max_diff, row.count_union)));

    ScoredTable {
        labels: table.labels,
        rows,
    }
}
