//! Pipeline orchestrator for master/slave duplicate detection.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs the complete comparison:
//! 1. **Enumerate** - Walk the master and slave roots into entry collections
//! 2. **Aggregate** - Count files and bytes per collection
//! 3. **Candidates** - Pair master/slave entries with equal sizes
//! 4. **Verify** - Confirm candidates by full content digest
//!
//! Every failure along the way is per-item and ends up in the
//! [`ScanSummary`]; the pipeline itself always runs to completion.
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::duplicates::{DuplicateFinder, FinderConfig};
//! use crossdupe::scanner::WalkerConfig;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (matches, summary) = finder.find_duplicates(
//!     WalkerConfig::new("/photos/master"),
//!     WalkerConfig::new("/photos/backup"),
//! );
//!
//! println!("found {} verified matches", summary.verified_matches);
//! for m in &matches {
//!     println!("{}  {} == {}", m.digest, m.master.display(), m.slave.display());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::candidates::{match_sized, SizedEntries};
use super::verify::{verify_candidates, UnverifiableMatch, VerifiedMatch, VerifyConfig};
use crate::progress::{ProgressCallback, PHASE_ENUMERATE};
use crate::scanner::{Entry, EntryError, Hasher, ScanError, WalkOutcome, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of worker threads for digest computation.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Hash large files through a memory map instead of streamed reads.
    pub use_mmap: bool,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("use_mmap", &self.use_mmap)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            use_mmap: false,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the worker thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable memory-mapped hashing for large files.
    #[must_use]
    pub fn with_mmap(mut self, enabled: bool) -> Self {
        self.use_mmap = enabled;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// File count and byte total of one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Number of entries enumerated
    pub files: usize,
    /// Sum of sizes of entries that could be stat'ed
    pub total_size: u64,
}

impl CollectionStats {
    /// Aggregate a collection. Entries whose size fails are counted but add
    /// no bytes; the failure itself is reported by candidate matching.
    #[must_use]
    pub fn collect(entries: &[Entry]) -> Self {
        Self::from_sized(&SizedEntries::collect(entries))
    }

    /// Aggregate a collection whose sizes were already queried.
    #[must_use]
    pub fn from_sized(sized: &SizedEntries<'_>) -> Self {
        Self {
            files: sized.len(),
            total_size: sized.total_size(),
        }
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Summary statistics from a comparison.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Master collection totals
    pub master: CollectionStats,
    /// Slave collection totals
    pub slave: CollectionStats,
    /// Number of equal-size master/slave pairs
    pub candidate_matches: usize,
    /// Number of pairs confirmed by digest
    pub verified_matches: usize,
    /// Number of pairs whose digests differed
    pub distinct_matches: usize,
    /// Pairs that could not be verified
    pub unverifiable: Vec<UnverifiableMatch>,
    /// Entries whose size could not be determined
    pub size_failures: Vec<EntryError>,
    /// Directories that could not be read
    pub scan_errors: Vec<ScanError>,
    /// Duration of the entire comparison
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Files across both collections.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.master.files + self.slave.files
    }

    /// Bytes across both collections.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.master.total_size + self.slave.total_size
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size()).to_string()
    }

    /// Whether any item could not be enumerated, stat'ed, or verified.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.unverifiable.is_empty() || !self.size_failures.is_empty() || !self.scan_errors.is_empty()
    }
}

/// Errors for invalid comparison roots.
///
/// Only raised by [`check_root`]; the pipeline itself treats unreadable
/// directories as recoverable.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Check that `path` exists and is a directory.
///
/// # Errors
///
/// Returns [`FinderError::PathNotFound`] or [`FinderError::NotADirectory`].
pub fn check_root(path: &Path) -> Result<(), FinderError> {
    if !path.exists() {
        return Err(FinderError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Duplicate finder that orchestrates the comparison pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    verify_config: VerifyConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut verify_config = VerifyConfig::default()
            .with_io_threads(config.io_threads)
            .with_hasher(Hasher::new().with_mmap(config.use_mmap));
        if let Some(ref callback) = config.progress_callback {
            verify_config = verify_config.with_progress_callback(Arc::clone(callback));
        }
        Self {
            config,
            verify_config,
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Enumerate both roots and compare them.
    ///
    /// Roots that cannot be read contribute no entries and are reported in
    /// [`ScanSummary::scan_errors`].
    #[must_use]
    pub fn find_duplicates(
        &self,
        master: WalkerConfig,
        slave: WalkerConfig,
    ) -> (Vec<VerifiedMatch>, ScanSummary) {
        let start_time = Instant::now();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_ENUMERATE, 0);
        }
        let master = self.enumerate("master", master);
        let slave = self.enumerate("slave", slave);
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_ENUMERATE);
        }

        let (matches, mut summary) = self.find_duplicates_in(&master.entries, &slave.entries);
        summary.scan_errors = master.errors;
        summary.scan_errors.extend(slave.errors);
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Comparison finished in {:.2?}: {} verified of {} candidates",
            summary.scan_duration,
            summary.verified_matches,
            summary.candidate_matches
        );
        (matches, summary)
    }

    /// Compare two already-enumerated collections.
    #[must_use]
    pub fn find_duplicates_in(
        &self,
        master: &[Entry],
        slave: &[Entry],
    ) -> (Vec<VerifiedMatch>, ScanSummary) {
        let start_time = Instant::now();
        let master_sizes = SizedEntries::collect(master);
        let slave_sizes = SizedEntries::collect(slave);
        let mut summary = ScanSummary {
            master: CollectionStats::from_sized(&master_sizes),
            slave: CollectionStats::from_sized(&slave_sizes),
            ..Default::default()
        };
        log::info!(
            "found {} files, total size: {}",
            summary.total_files(),
            summary.total_size_display()
        );

        let candidates = match_sized(&master_sizes, &slave_sizes);
        summary.candidate_matches = candidates.len();

        let report = verify_candidates(&candidates, &self.verify_config);
        summary.verified_matches = report.verified.len();
        summary.distinct_matches = report.distinct;
        summary.unverifiable = report.unverifiable;
        summary.size_failures = candidates.size_failures;
        summary.scan_duration = start_time.elapsed();

        (report.verified, summary)
    }

    fn enumerate(&self, label: &str, config: WalkerConfig) -> WalkOutcome {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_message(&format!("Enumerating {label}: {}", config.root.display()));
        }
        let outcome = Walker::new(config).walk();
        log::debug!("{}: {} files", label, outcome.entries.len());
        outcome
    }
}
