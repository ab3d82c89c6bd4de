//! Cross-source aggregation: index each peak document by gene, outer-join the
//! indices and rank genes by how consistently the sources agree.

pub mod index;
pub mod merge;
pub mod score;
pub mod table;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::peak::PeakDocument;

use index::{GeneIndex, index_peaks};
use score::ScoredTable;

/// Load and index every readable peak document, labelled by file name.
///
/// Unreadable or invalid documents are skipped with a warning; it is an
/// error only when none remain.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<(String, GeneIndex)>, Error> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        match load_source(path) {
            Ok(index) => sources.push((table::label_for(path), index)),
            Err(e) => log::warn!("skipping {}: {e}", path.display()),
        }
    }
    if sources.is_empty() {
        return Err(Error::InvalidInput(format!(
            "none of the {} peak documents could be read",
            paths.len()
        )));
    }
    Ok(sources)
}

fn load_source(path: &Path) -> Result<GeneIndex, Error> {
    let file = File::open(path)?;
    let document = PeakDocument::from_reader(BufReader::new(file))?;
    Ok(index_peaks(&document.peaks))
}

/// Merge and score labelled indices.
pub fn aggregate(sources: Vec<(String, GeneIndex)>) -> Result<ScoredTable, Error> {
    Ok(score::score(merge::merge(sources)?))
}
