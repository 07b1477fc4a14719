//! crossdupe - Master/slave duplicate file finder
//!
//! Enumerates two directory trees and reports every file in the slave tree
//! whose content duplicates a file in the master tree. Files are paired by
//! size and confirmed by a 128-bit BLAKE3 content digest.

pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;

use cli::{Cli, OutputFormat};
use duplicates::{check_root, DuplicateFinder, FinderConfig};
use error::ExitCode;
use output::{JsonOutput, TextOutput};
use progress::Progress;
use scanner::WalkerConfig;

/// Run the comparison described by `cli` and print the report to stdout.
///
/// Returns the exit code for a completed comparison. Logging must already
/// be initialized by the caller.
///
/// # Errors
///
/// Fails if either root is missing or not a directory, or if the report
/// cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    check_root(&cli.master).context("invalid master directory")?;
    check_root(&cli.slave).context("invalid slave directory")?;

    let walker_config = |root: &std::path::Path| {
        WalkerConfig::new(root)
            .with_recursive(!cli.no_recursive)
            .with_verbose(cli.verbose > 0)
            .with_name_patterns(cli.include.clone(), cli.exclude.clone())
    };

    let mut config = FinderConfig::default()
        .with_io_threads(cli.io_threads)
        .with_mmap(cli.mmap);
    if cli.show_progress() {
        config = config.with_progress_callback(Arc::new(Progress::new()));
    }

    log::info!(
        "Comparing {} (master) against {} (slave)",
        cli.master.display(),
        cli.slave.display()
    );
    let finder = DuplicateFinder::new(config);
    let (matches, summary) =
        finder.find_duplicates(walker_config(&cli.master), walker_config(&cli.slave));

    let exit_code = ExitCode::from_summary(&summary);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => {
            TextOutput::new(&matches, &summary)
                .write_to(&mut out)
                .context("failed to write report")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&matches, &summary, exit_code)
                .write_to(&mut out, true)
                .context("failed to write JSON report")?;
        }
    }
    out.flush().context("failed to flush stdout")?;

    Ok(exit_code)
}
