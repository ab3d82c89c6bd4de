use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use eclipkit::accession::scan_files;
use eclipkit::cli;
use eclipkit::config::ServiceConfig;
use eclipkit::resolver::MetadataResolver;
use eclipkit::service::ensembl::EnsemblClient;

#[derive(Parser)]
#[command(
    name = "build_lookup",
    about = "Resolve every Ensembl accession found in the inputs into a metadata lookup document"
)]
struct Cli {
    /// Path to the JSON service configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Output lookup document (JSON)
    #[arg(short = 'o', long = "out")]
    out: PathBuf,

    /// Log per-request progress
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Files to scan for accessions
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();
    cli::init_logging(cli_args.verbose);

    cli::banner("Build Lookup");

    // ── Configuration ────────────────────────────────────
    cli::section("Configuration");

    let config = ServiceConfig::load(cli_args.config.as_deref())?;
    cli::kv("Server", config.base_url());
    cli::kv("Species", &config.species);
    cli::kv("Threads", &config.threads.to_string());
    cli::kv("Output", &cli_args.out.display().to_string());

    eprintln!();

    // ── Scanning ─────────────────────────────────────────
    cli::section("Scanning");

    let accessions = scan_files(&cli_args.files)?;
    cli::kv("Input files", &cli_args.files.len().to_string());
    cli::kv("Accessions", &accessions.len().to_string());

    eprintln!();

    // ── Lookup ───────────────────────────────────────────
    cli::section("Lookup");

    let threads = config.threads;
    let mut resolver = MetadataResolver::new(EnsemblClient::new(config));
    let bar = cli::progress_bar(0, "lookups");
    let issued = resolver.prefetch(accessions.iter().map(String::as_str), threads, &bar)?;
    bar.finish_and_clear();

    let document = resolver.into_document();
    let unresolved = document.iter().filter(|(_, m)| m.unresolved).count();

    cli::kv("Requests", &issued.to_string());
    cli::kv("Entries", &document.len().to_string());
    if unresolved > 0 {
        cli::warning(&format!("{unresolved} identifiers could not be resolved"));
    }

    let out_file = File::create(&cli_args.out)
        .with_context(|| format!("failed to create {}", cli_args.out.display()))?;
    document
        .write(BufWriter::new(out_file))
        .with_context(|| format!("failed to write {}", cli_args.out.display()))?;

    cli::success(&format!("wrote {}", cli_args.out.display()));
    cli::print_summary(start);
    Ok(())
}
