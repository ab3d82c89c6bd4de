//! Codon translation tables and in-frame codon usage of a binding site.

use std::collections::BTreeMap;

/// Amino acids in codon-index order (A=0, C=1, G=2, T/U=3; index = first*16 + second*4 + third).
const STANDARD_CODE: &[u8; 64] =
    b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF";

/// Lookup table for translating codons to amino acids.
pub struct CodonTable {
    table: [u8; 64],
}

fn base_to_index(b: u8) -> Option<usize> {
    match b {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' | b'U' | b'u' => Some(3),
        _ => None,
    }
}

impl CodonTable {
    /// Standard genetic code (NCBI translation table 1).
    #[must_use]
    pub fn standard() -> Self {
        Self {
            table: *STANDARD_CODE,
        }
    }

    /// Vertebrate mitochondrial genetic code (NCBI translation table 2).
    #[must_use]
    pub fn mitochondrial() -> Self {
        let mut table = *STANDARD_CODE;
        table[56] = b'W'; // TGA
        table[8] = b'*'; // AGA
        table[10] = b'*'; // AGG
        table[12] = b'M'; // ATA
        Self { table }
    }

    /// Table matching an Ensembl `seq_region_name`.
    #[must_use]
    pub fn for_region(seq_region_name: &str) -> Self {
        match seq_region_name {
            "MT" | "chrM" | "chrMT" => Self::mitochondrial(),
            _ => Self::standard(),
        }
    }

    /// Translate a single codon (3 bytes) to an amino acid; `X` when ambiguous or short.
    #[must_use]
    pub fn translate_codon(&self, codon: &[u8]) -> u8 {
        let [a, b, c] = match codon {
            [a, b, c, ..] => [*a, *b, *c],
            _ => return b'X',
        };
        match (base_to_index(a), base_to_index(b), base_to_index(c)) {
            (Some(a), Some(b), Some(c)) => self.table[a * 16 + b * 4 + c],
            _ => b'X',
        }
    }
}

/// Occurrences of one codon inside a binding site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodonCount {
    pub amino_acid: char,
    pub count: usize,
}

/// Count the CDS codons (frame 0) that fall inside the binding site.
///
/// The site is located by exact match of `site` within `cds`; `None` when it
/// does not occur. A codon is counted when it starts strictly after the site
/// start and ends at or before the site end.
#[must_use]
pub fn codon_usage(
    cds: &str,
    site: &str,
    table: &CodonTable,
) -> Option<BTreeMap<String, CodonCount>> {
    if site.is_empty() {
        return None;
    }
    let site_start = cds.find(site)?;
    let site_end = site_start + site.len();
    let bytes = cds.as_bytes();

    let mut counts: BTreeMap<String, CodonCount> = BTreeMap::new();
    let first = (site_start / 3 + 1) * 3;
    for codon_start in (first..).step_by(3).take_while(|&c| c + 3 <= site_end) {
        let codon = &bytes[codon_start..codon_start + 3];
        let key = String::from_utf8_lossy(codon).into_owned();
        counts
            .entry(key)
            .or_insert(CodonCount {
                amino_acid: table.translate_codon(codon) as char,
                count: 0,
            })
            .count += 1;
    }
    Some(counts)
}
