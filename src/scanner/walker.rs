//! Directory walker built on walkdir.
//!
//! # Overview
//!
//! [`Walker`] produces a flat list of [`Entry`] values for every regular file
//! under a root, in pre-order depth-first order with children sorted by name.
//! Unreadable directories are recorded as [`ScanError::SubtreeUnavailable`]
//! and skipped; the walk itself never aborts.
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::scanner::{NameFilter, Walker, WalkerConfig};
//!
//! let config = WalkerConfig::new("/photos")
//!     .with_recursive(true)
//!     .with_filter(NameFilter::new(|name| name.ends_with(".jpg")));
//!
//! let outcome = Walker::new(config).walk();
//! println!("{} files, {} unreadable folders", outcome.entries.len(), outcome.errors.len());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;
use walkdir::WalkDir;

use super::{Entry, ScanError};

/// File names that are never collected: OS metadata sidecars.
pub const SENTINEL_NAMES: &[&str] = &[".DS_Store", ".localized", "Thumbs.db", "desktop.ini"];

/// Prefix of AppleDouble resource-fork sidecars.
const APPLE_DOUBLE_PREFIX: &str = "._";

/// Whether `name` is an OS sentinel file.
#[must_use]
pub fn is_sentinel(name: &str) -> bool {
    SENTINEL_NAMES.contains(&name) || name.starts_with(APPLE_DOUBLE_PREFIX)
}

/// Predicate over file names deciding which files are collected.
#[derive(Clone)]
pub struct NameFilter {
    predicate: Arc<dyn Fn(&str) -> bool + Send + Sync>,
}

impl NameFilter {
    /// Wrap an arbitrary predicate.
    pub fn new(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Accept every name.
    #[must_use]
    pub fn accept_all() -> Self {
        Self::new(|_| true)
    }

    /// Build a filter from regex patterns.
    ///
    /// A name passes if it matches at least one `include` pattern (or
    /// `include` is empty) and matches none of `exclude`.
    #[must_use]
    pub fn from_patterns(include: Vec<Regex>, exclude: Vec<Regex>) -> Self {
        if include.is_empty() && exclude.is_empty() {
            return Self::accept_all();
        }
        Self::new(move |name| {
            (include.is_empty() || include.iter().any(|re| re.is_match(name)))
                && !exclude.iter().any(|re| re.is_match(name))
        })
    }

    /// Evaluate the filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        (self.predicate)(name)
    }
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl fmt::Debug for NameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NameFilter(<predicate>)")
    }
}

/// Configuration for one enumeration.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Root directory to enumerate.
    pub root: PathBuf,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Report every directory entered at info level.
    pub verbose: bool,
    /// File name filter.
    pub filter: NameFilter,
}

impl WalkerConfig {
    /// Recursive, quiet, accept-all configuration for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: true,
            verbose: false,
            filter: NameFilter::accept_all(),
        }
    }

    /// Set recursion.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set verbose subtree reporting.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the file name filter.
    #[must_use]
    pub fn with_filter(mut self, filter: NameFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the filter with include/exclude regex patterns.
    #[must_use]
    pub fn with_name_patterns(self, include: Vec<Regex>, exclude: Vec<Regex>) -> Self {
        self.with_filter(NameFilter::from_patterns(include, exclude))
    }
}

/// Result of a walk: the collected entries plus recoverable errors.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Regular files that passed the filter, in walk order.
    pub entries: Vec<Entry>,
    /// Directories that could not be read.
    pub errors: Vec<ScanError>,
}

impl WalkOutcome {
    /// Whether every directory could be read.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Directory walker.
#[derive(Debug)]
pub struct Walker {
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker.
    #[must_use]
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Configuration this walker was built with.
    #[must_use]
    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Enumerate the tree.
    ///
    /// Only regular files are collected. Directories are descended when
    /// recursion is enabled; symlinks and special files are skipped.
    #[must_use]
    pub fn walk(&self) -> WalkOutcome {
        let root = &self.config.root;
        let mut outcome = WalkOutcome::default();

        let mut walk_dir = WalkDir::new(root).follow_links(false).sort_by_file_name();
        if !self.config.recursive {
            walk_dir = walk_dir.max_depth(1);
        }

        for item in walk_dir {
            let dent = match item {
                Ok(dent) => dent,
                Err(e) => {
                    let path = e.path().map_or_else(|| root.clone(), std::path::Path::to_path_buf);
                    log::warn!("Cannot read {}: {}", path.display(), e);
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("walk error"));
                    outcome.errors.push(ScanError::SubtreeUnavailable {
                        path,
                        source: Arc::new(source),
                    });
                    continue;
                }
            };

            let file_type = dent.file_type();

            if dent.depth() == 0 {
                if !file_type.is_dir() {
                    log::warn!("Not a directory: {}", dent.path().display());
                    outcome.errors.push(ScanError::SubtreeUnavailable {
                        path: dent.path().to_path_buf(),
                        source: Arc::new(std::io::Error::other("not a directory")),
                    });
                    continue;
                }
                self.report_folder(dent.path());
                continue;
            }

            if file_type.is_dir() {
                if self.config.recursive {
                    self.report_folder(dent.path());
                }
                continue;
            }

            if !file_type.is_file() {
                log::trace!("Skipping non-regular file: {}", dent.path().display());
                continue;
            }

            let name = dent.file_name().to_string_lossy();
            if is_sentinel(&name) {
                log::trace!("Skipping sentinel file: {}", dent.path().display());
                continue;
            }
            if !self.config.filter.matches(&name) {
                log::trace!("Filtered out: {}", dent.path().display());
                continue;
            }

            outcome.entries.push(Entry::new(dent.into_path()));
        }

        log::debug!(
            "Enumerated {} files under {} ({} unreadable folders)",
            outcome.entries.len(),
            root.display(),
            outcome.errors.len()
        );
        outcome
    }

    fn report_folder(&self, path: &std::path::Path) {
        if self.config.verbose {
            log::info!("Scanning folder {}", path.display());
        } else {
            log::trace!("Scanning folder {}", path.display());
        }
    }
}
