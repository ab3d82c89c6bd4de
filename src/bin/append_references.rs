use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use eclipkit::cli;
use eclipkit::config::ServiceConfig;
use eclipkit::metadata::LookupDocument;
use eclipkit::references::{AliasCache, append_references};
use eclipkit::service::ensembl::EnsemblClient;

#[derive(Parser)]
#[command(
    name = "append_references",
    about = "Append gene aliases and lookup metadata to an aggregated peak table"
)]
struct Cli {
    /// Path to the JSON service configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Aggregated table written by aggregate_peaks
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output table (tab-separated)
    #[arg(short = 'o', long = "out")]
    out: PathBuf,

    /// Log failed alias lookups and other details
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Lookup document written by build_lookup
    lookup: PathBuf,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();
    cli::init_logging(cli_args.verbose);

    cli::banner("Append References");

    cli::section("Configuration");

    let config = ServiceConfig::load(cli_args.config.as_deref())?;
    cli::kv("Server", config.base_url());
    cli::kv("Table", &cli_args.input.display().to_string());
    cli::kv("Lookup", &cli_args.lookup.display().to_string());
    cli::kv("Output", &cli_args.out.display().to_string());

    let lookup_file = File::open(&cli_args.lookup)
        .with_context(|| {
            format!(
                "failed to open lookup document: {}",
                cli_args.lookup.display()
            )
        })?;
    let lookup = LookupDocument::from_reader(BufReader::new(lookup_file))
        .with_context(|| {
            format!(
                "failed to parse lookup document: {}",
                cli_args.lookup.display()
            )
        })?;

    eprintln!();

    // ── Annotating ───────────────────────────────────────
    cli::section("Annotating");

    let input = File::open(&cli_args.input)
        .with_context(|| format!("failed to open {}", cli_args.input.display()))?;
    let output = File::create(&cli_args.out)
        .with_context(|| format!("failed to create {}", cli_args.out.display()))?;

    let mut aliases = AliasCache::new(EnsemblClient::new(config));
    let rows = append_references(
        BufReader::new(input),
        BufWriter::new(output),
        &lookup,
        &mut aliases,
    )
    .with_context(|| format!("failed to annotate {}", cli_args.input.display()))?;

    cli::kv("Rows", &rows.to_string());
    cli::success(&format!("wrote {}", cli_args.out.display()));
    cli::print_summary(start);
    Ok(())
}
