use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use eclipkit::binding::{SequenceRegion, binding_sequence};
use eclipkit::cli;
use eclipkit::codon::{CodonTable, codon_usage};
use eclipkit::config::ServiceConfig;
use eclipkit::sequence::SequenceCache;
use eclipkit::service::SequenceKind;
use eclipkit::service::ensembl::EnsemblClient;

#[derive(Parser)]
#[command(
    name = "binding_sequence",
    about = "Print the genomic sequence under a binding site and, for a transcript, its codon usage"
)]
struct Cli {
    /// Gene accession whose genomic sequence contains the site
    gene: String,

    /// Site start (genomic coordinate)
    start: u64,

    /// Site end (genomic coordinate, exclusive)
    end: u64,

    /// Transcript accession whose CDS is used for codon usage
    #[arg(short = 't', long = "transcript")]
    transcript: Option<String>,

    /// Path to the JSON service configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Log clipping and request details
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();
    cli::init_logging(cli_args.verbose);

    cli::banner("Binding Sequence");

    let config = ServiceConfig::load(cli_args.config.as_deref())?;
    let mut sequences = SequenceCache::new(EnsemblClient::new(config));

    cli::section("Site");

    let genomic = sequences
        .get(&cli_args.gene, SequenceKind::Genomic)
        .with_context(|| format!("failed to fetch genomic sequence of {}", cli_args.gene))?
        .clone();
    let region: SequenceRegion = genomic.desc.parse()?;
    cli::kv("Gene", &cli_args.gene);
    cli::kv(
        "Region",
        &format!("{}:{}-{} ({})", region.region, region.start, region.end, region.strand),
    );
    cli::kv("Site", &format!("{}-{}", cli_args.start, cli_args.end));

    let site = binding_sequence(&genomic, cli_args.start, cli_args.end)?;
    if site.was_clipped() {
        cli::warning(&format!(
            "site clipped by {} at the start and {} at the end",
            site.clipped_start, site.clipped_end
        ));
    }
    println!("{}", site.sequence);

    if let Some(transcript) = &cli_args.transcript {
        eprintln!();
        cli::section("Codon Usage");

        let cds = sequences
            .get(transcript, SequenceKind::Cds)
            .with_context(|| format!("failed to fetch CDS of {transcript}"))?;
        let table = CodonTable::for_region(&region.region);
        match codon_usage(&cds.seq, &site.sequence, &table) {
            Some(usage) => {
                for (codon, count) in &usage {
                    cli::kv(codon, &format!("{} {}", count.amino_acid, count.count));
                }
            }
            None => cli::warning(&format!(
                "site sequence is not part of the CDS of {transcript}"
            )),
        }
    }

    eprintln!();
    eprintln!("{} {}", "Length".dimmed(), site.sequence.len());
    cli::print_summary(start);
    Ok(())
}
