//! Gene-peak index: group one source's peaks under the gene they annotate.

use std::collections::{BTreeMap, BTreeSet};

use crate::peak::BasePeak;
use crate::strand::Strand;

/// Distinct peak positions seen for one gene in one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRecord {
    pub strand: Strand,
    pub peaks: BTreeSet<String>,
}

/// Gene id → record, ordered by gene id.
pub type GeneIndex = BTreeMap<String, GeneRecord>;

/// Fold every annotation of every peak into a gene index.
///
/// A peak counts once per gene no matter how many of its annotations point
/// at that gene. The gene's strand is that of the last annotation folded.
#[must_use]
pub fn index_peaks(peaks: &[BasePeak]) -> GeneIndex {
    let mut index = GeneIndex::new();
    for peak in peaks {
        let position = peak.position_string();
        for annotation in &peak.annotations {
            let strand = annotation.location.strand;
            index
                .entry(annotation.gene_id().to_string())
                .and_modify(|record| {
                    record.strand = strand;
                    record.peaks.insert(position.clone());
                })
                .or_insert_with(|| GeneRecord {
                    strand,
                    peaks: BTreeSet::from([position.clone()]),
                });
        }
    }
    index
}
