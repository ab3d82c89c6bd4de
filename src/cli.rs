//! Shared CLI output helpers for the eclipkit binaries.

use std::time::{Duration, Instant};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use simple_logger::SimpleLogger;

pub fn banner(subtitle: &str) {
    eprintln!();
    eprintln!("{} {}", "eclipkit".bold().cyan(), subtitle.dimmed());
    eprintln!();
}

pub fn section(title: &str) {
    let bar = "─".repeat(50);
    eprintln!("{} {}", title.bold().blue(), bar.dimmed());
}

pub fn kv(key: &str, value: &str) {
    eprintln!("  {:<20} {}", key.dimmed(), value);
}

pub fn success(msg: &str) {
    eprintln!("  {} {}", "✓".green().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow(), msg.yellow());
}

/// Route library warnings (unresolved identifiers, skipped rows, clipped
/// ranges) to stderr. `--verbose` also shows per-file progress messages.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    // A second initialisation only happens in tests; the first logger wins.
    let _ = SimpleLogger::new().with_level(level).init();
}

/// Progress bar used while identifiers are looked up.
#[must_use]
pub fn progress_bar(length: u64, msg: &str) -> ProgressBar {
    let bar = ProgressBar::new(length);
    if let Ok(style) =
        ProgressStyle::with_template("  {msg:<20} {wide_bar:.cyan/blue} {pos}/{len} ETA {eta}")
    {
        bar.set_style(style);
    }
    bar.set_message(msg.to_owned());
    bar
}

/// Formats a duration as HH:MM:SS.d (tenths of a second).
#[must_use]
pub fn format_elapsed(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let tenths = d.subsec_millis() / 100;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{tenths}")
}

pub fn print_summary(start: Instant) {
    eprintln!();
    eprintln!(
        "{}  {}",
        "Time".dimmed(),
        format_elapsed(start.elapsed()).bold()
    );
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_elapsed_basic() {
        assert_eq!(format_elapsed(Duration::from_millis(4400)), "00:00:04.4");
        assert_eq!(format_elapsed(Duration::from_secs(61)), "00:01:01.0");
        assert_eq!(format_elapsed(Duration::from_secs(3661)), "01:01:01.0");
    }

    #[test]
    fn progress_bar_has_length() {
        let bar = progress_bar(12, "lookups");
        assert_eq!(bar.length(), Some(12));
    }
}
