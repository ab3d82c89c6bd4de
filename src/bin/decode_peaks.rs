use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use eclipkit::bed::decode_file;
use eclipkit::bed::layout::RecordLayout;
use eclipkit::cli;
use eclipkit::metadata::LookupDocument;
use eclipkit::peak::PeakDocument;

#[derive(Parser)]
#[command(
    name = "decode_peaks",
    about = "Decode an annotated eCLIP peak file into a peak document"
)]
struct Cli {
    /// Annotated peak file (tab-separated, optionally gzipped)
    input: PathBuf,

    /// Lookup document written by build_lookup
    lookup: PathBuf,

    /// Output peak document (JSON)
    out: PathBuf,

    /// Log skipped rows and other details
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();
    cli::init_logging(cli_args.verbose);

    cli::banner("Decode Peaks");

    cli::section("Inputs");
    cli::kv("Peaks", &cli_args.input.display().to_string());
    cli::kv("Lookup", &cli_args.lookup.display().to_string());
    cli::kv("Output", &cli_args.out.display().to_string());

    let lookup_file = File::open(&cli_args.lookup)
        .with_context(|| {
            format!(
                "failed to open lookup document: {}",
                cli_args.lookup.display()
            )
        })?;
    let mut lookup = LookupDocument::from_reader(BufReader::new(lookup_file))
        .with_context(|| {
            format!(
                "failed to parse lookup document: {}",
                cli_args.lookup.display()
            )
        })?;
    cli::kv("Lookup entries", &lookup.len().to_string());

    eprintln!();

    // ── Decoding ─────────────────────────────────────────
    cli::section("Decoding");

    let (peaks, summary) = decode_file(&cli_args.input, &RecordLayout::ECLIP, &mut lookup)
        .with_context(|| format!("failed to decode {}", cli_args.input.display()))?;

    cli::kv("Rows", &summary.rows.to_string());
    cli::kv("Peaks", &summary.peaks.to_string());
    cli::kv("Annotations", &summary.annotations.to_string());
    cli::kv("Unannotated", &summary.unknown.to_string());
    if summary.malformed > 0 {
        cli::warning(&format!("{} malformed rows skipped", summary.malformed));
    }

    let out_file = File::create(&cli_args.out)
        .with_context(|| format!("failed to create {}", cli_args.out.display()))?;
    PeakDocument::new(peaks)
        .write(BufWriter::new(out_file))
        .with_context(|| format!("failed to write {}", cli_args.out.display()))?;

    cli::success(&format!("wrote {}", cli_args.out.display()));
    cli::print_summary(start);
    Ok(())
}
