//! Scanner module for directory enumeration and per-file attributes.
//!
//! This module provides functionality for:
//! - Depth-first directory enumeration with a name filter
//! - Lazily computed, memoized file size and content digest
//! - Streaming BLAKE3 content hashing
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`entry`]: One discovered file with its cached attributes
//! - [`hasher`]: 128-bit content digests (streaming, optional mmap)
//! - [`walker`]: Directory traversal and file discovery
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::scanner::{Walker, WalkerConfig};
//!
//! let outcome = Walker::new(WalkerConfig::new("/photos")).walk();
//! for entry in &outcome.entries {
//!     match entry.size() {
//!         Ok(size) => println!("{}: {} bytes", entry.path().display(), size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod entry;
pub mod hasher;
pub mod walker;

use std::path::PathBuf;
use std::sync::Arc;

// Re-export main types
pub use entry::Entry;
pub use hasher::{Digest, Hasher, DIGEST_LEN};
pub use walker::{NameFilter, WalkOutcome, Walker, WalkerConfig, SENTINEL_NAMES};

/// Errors raised while computing an entry's attributes.
///
/// Both variants are per-entry and recoverable. The `source` is shared so a
/// single failure can be attached to every match that touches the entry.
#[derive(thiserror::Error, Debug, Clone)]
pub enum EntryError {
    /// The size query failed (path vanished, permission denied).
    #[error("Metadata unavailable for {path}: {source}")]
    MetadataUnavailable {
        /// Path of the entry
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The file could not be opened or read for hashing.
    #[error("Content unreadable for {path}: {source}")]
    ContentUnreadable {
        /// Path of the entry
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl EntryError {
    /// Build a `MetadataUnavailable` error.
    #[must_use]
    pub fn metadata(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MetadataUnavailable {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Build a `ContentUnreadable` error.
    #[must_use]
    pub fn content(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ContentUnreadable {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Path of the entry the error belongs to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::MetadataUnavailable { path, .. } | Self::ContentUnreadable { path, .. } => path,
        }
    }

    /// Kind of the underlying I/O error.
    #[must_use]
    pub fn io_kind(&self) -> std::io::ErrorKind {
        match self {
            Self::MetadataUnavailable { source, .. } | Self::ContentUnreadable { source, .. } => {
                source.kind()
            }
        }
    }
}

/// Errors that can occur during directory enumeration.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// A directory could not be opened; its subtree contributes no entries.
    #[error("Subtree unavailable: {path}: {source}")]
    SubtreeUnavailable {
        /// Directory that could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl ScanError {
    /// Directory the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::SubtreeUnavailable { path, .. } => path,
        }
    }
}
