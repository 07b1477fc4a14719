//! Command-line interface definitions for crossdupe.
//!
//! All options are defined with the clap derive API. Environment fallbacks
//! come from clap's `env` feature.
//!
//! # Example
//!
//! ```bash
//! # Report which backup files duplicate the originals
//! crossdupe ~/Pictures /mnt/backup/Pictures
//!
//! # Only top-level JPEGs, JSON for scripting
//! crossdupe --no-recursive --include '\.jpe?g$' ~/Pictures /mnt/backup --output json
//!
//! # Verbose mode traces every folder
//! crossdupe -v ~/Pictures /mnt/backup/Pictures
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use regex::Regex;

/// Find files in a slave tree that duplicate files in a master tree.
///
/// Files are paired by size first and confirmed by a 128-bit BLAKE3 digest
/// of their full content.
#[derive(Debug, Parser)]
#[command(name = "crossdupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Reference directory whose files are looked for elsewhere
    #[arg(value_name = "MASTER")]
    pub master: PathBuf,

    /// Directory searched for copies of master files
    #[arg(value_name = "SLAVE")]
    pub slave: PathBuf,

    /// Only look at the top level of both directories
    #[arg(long)]
    pub no_recursive: bool,

    /// Only consider files whose name matches (can be specified multiple times)
    #[arg(long = "include", value_name = "REGEX", value_parser = parse_regex)]
    pub include: Vec<Regex>,

    /// Skip files whose name matches (can be specified multiple times)
    #[arg(long = "exclude", value_name = "REGEX", value_parser = parse_regex)]
    pub exclude: Vec<Regex>,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", default_value = "4", env = "CROSSDUPE_IO_THREADS")]
    pub io_threads: usize,

    /// Hash large files through a memory map
    #[arg(long)]
    pub mmap: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Do not draw progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Report fatal errors as a JSON document on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Whether progress bars should be drawn for this invocation.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !(self.quiet || self.no_progress || self.output == OutputFormat::Json)
    }
}

/// Output format for comparison results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a file name pattern.
///
/// # Examples
///
/// ```
/// use crossdupe::cli::parse_regex;
///
/// assert!(parse_regex(r"\.jpg$").unwrap().is_match("a.jpg"));
/// assert!(parse_regex("(").is_err());
/// ```
///
/// # Errors
///
/// Returns the regex compiler's message for invalid patterns.
pub fn parse_regex(s: &str) -> Result<Regex, String> {
    Regex::new(s).map_err(|e| format!("invalid pattern '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_help() {
        let result = Cli::try_parse_from(["crossdupe", "--help"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayHelp
        );
    }

    #[test]
    fn test_cli_parse_basic() {
        let cli = Cli::try_parse_from(["crossdupe", "/master", "/slave"]).unwrap();
        assert_eq!(cli.master, PathBuf::from("/master"));
        assert_eq!(cli.slave, PathBuf::from("/slave"));
        assert!(!cli.no_recursive);
        assert!(cli.include.is_empty());
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(!cli.mmap);
        assert!(cli.show_progress());
    }

    #[test]
    fn test_cli_requires_both_roots() {
        assert!(Cli::try_parse_from(["crossdupe", "/master"]).is_err());
        assert!(Cli::try_parse_from(["crossdupe"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::try_parse_from([
            "crossdupe",
            "-vv",
            "--no-recursive",
            "--include",
            r"\.jpg$",
            "--include",
            r"\.png$",
            "--exclude",
            "^tmp",
            "--io-threads",
            "2",
            "--mmap",
            "--output",
            "json",
            "/master",
            "/slave",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(cli.no_recursive);
        assert_eq!(cli.include.len(), 2);
        assert!(cli.include[1].is_match("x.png"));
        assert_eq!(cli.exclude.len(), 1);
        assert_eq!(cli.io_threads, 2);
        assert!(cli.mmap);
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(!cli.show_progress());
    }

    #[test]
    fn test_cli_invalid_regex_rejected() {
        let result = Cli::try_parse_from(["crossdupe", "--include", "[", "/m", "/s"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["crossdupe", "-q", "-v", "/m", "/s"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_quiet_disables_progress() {
        let cli = Cli::try_parse_from(["crossdupe", "-q", "/m", "/s"]).unwrap();
        assert!(cli.quiet);
        assert!(!cli.show_progress());

        let cli = Cli::try_parse_from(["crossdupe", "--no-progress", "/m", "/s"]).unwrap();
        assert!(!cli.show_progress());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
