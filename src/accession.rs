//! Ensembl accession scanning over arbitrary text files.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::bed::open_input;
use crate::error::Error;

/// `ENS` + one type letter + eleven digits (`ENSG00000141510`, `ENST…`).
static ACCESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ENS.\d{11}").unwrap_or_else(|e| panic!("invalid accession pattern: {e}"))
});

/// Every distinct accession in `text`, in sorted order.
#[must_use]
pub fn scan_text(text: &str) -> BTreeSet<String> {
    ACCESSION
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Distinct accessions across `paths`; unreadable files are skipped with a
/// warning. Fails only if no file could be read.
pub fn scan_files(paths: &[PathBuf]) -> Result<BTreeSet<String>, Error> {
    let mut accessions = BTreeSet::new();
    let mut readable = 0;
    for path in paths {
        let mut text = String::new();
        let read = open_input(path).and_then(|mut r| Ok(r.read_to_string(&mut text)?));
        match read {
            Ok(_) => {
                readable += 1;
                accessions.extend(scan_text(&text));
            }
            Err(e) => log::warn!("skipping {}: {e}", path.display()),
        }
    }
    if readable == 0 {
        return Err(Error::InvalidInput(format!(
            "none of the {} input files could be read",
            paths.len()
        )));
    }
    Ok(accessions)
}
