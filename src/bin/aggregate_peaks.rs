use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use eclipkit::aggregate::{aggregate, load_sources, table};
use eclipkit::cli;

#[derive(Parser)]
#[command(
    name = "aggregate_peaks",
    about = "Aggregate peak documents per gene and rank genes by replicate consistency"
)]
struct Cli {
    /// Output table (tab-separated)
    out: PathBuf,

    /// Peak documents written by decode_peaks; each file is one source
    #[arg(required = true)]
    documents: Vec<PathBuf>,

    /// Log skipped documents and other details
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();
    cli::init_logging(cli_args.verbose);

    cli::banner("Aggregate Peaks");

    // ── Sources ──────────────────────────────────────────
    cli::section("Sources");

    let sources = load_sources(&cli_args.documents)?;
    for (label, index) in &sources {
        cli::kv(label, &format!("{} genes", index.len()));
    }
    let skipped = cli_args.documents.len() - sources.len();
    if skipped > 0 {
        cli::warning(&format!("{skipped} documents skipped"));
    }

    eprintln!();

    // ── Scoring ──────────────────────────────────────────
    cli::section("Scoring");

    let scored = aggregate(sources)?;
    cli::kv("Genes", &scored.rows.len().to_string());
    if let Some(top) = scored.rows.first() {
        cli::kv(
            "Top gene",
            &format!("{} (union-max-diff {})", top.gene_id, top.union_max_diff),
        );
    }

    let out_file = File::create(&cli_args.out)
        .with_context(|| format!("failed to create {}", cli_args.out.display()))?;
    table::write_table(&scored, BufWriter::new(out_file))
        .with_context(|| format!("failed to write {}", cli_args.out.display()))?;

    cli::success(&format!("wrote {}", cli_args.out.display()));
    cli::print_summary(start);
    Ok(())
}
