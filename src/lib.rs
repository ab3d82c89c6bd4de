//! eclipkit: eCLIP peak annotation, gene-level aggregation and replicate consistency scoring.

pub mod error;

pub mod accession;
pub mod aggregate;
pub mod bed;
pub mod binding;
pub mod cli;
pub mod codon;
pub mod config;
pub mod metadata;
pub mod peak;
pub mod references;
pub mod resolver;
pub mod sequence;
pub mod service;
pub mod strand;
