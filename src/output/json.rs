//! JSON output formatter for comparison results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "matches": [
//!     {
//!       "master": "/photos/a.jpg",
//!       "slave": "/backup/b.jpg",
//!       "size": 1024,
//!       "digest": "9f86d081884c7d659a2feaa0c55ad015"
//!     }
//!   ],
//!   "unverifiable": [
//!     { "master": "/photos/c.jpg", "slave": "/backup/c.jpg", "size": 7, "error": "..." }
//!   ],
//!   "errors": [
//!     { "path": "/backup/locked", "kind": "subtree_unavailable", "message": "..." }
//!   ],
//!   "summary": {
//!     "master_files": 10,
//!     "master_size": 52000,
//!     "slave_files": 12,
//!     "slave_size": 61000,
//!     "candidate_matches": 3,
//!     "verified_matches": 1,
//!     "distinct_matches": 1,
//!     "scan_duration_ms": 12,
//!     "exit_code": 3,
//!     "exit_code_name": "CD003"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{ScanSummary, UnverifiableMatch, VerifiedMatch};
use crate::error::ExitCode;
use crate::scanner::{EntryError, ScanError};

/// A candidate that could not be verified, in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonUnverifiable {
    /// Path in the master collection
    pub master: String,
    /// Path in the slave collection
    pub slave: String,
    /// Shared file size in bytes
    pub size: u64,
    /// Why the digest could not be computed
    pub error: String,
}

impl From<&UnverifiableMatch> for JsonUnverifiable {
    fn from(m: &UnverifiableMatch) -> Self {
        Self {
            master: m.master.to_string_lossy().into_owned(),
            slave: m.slave.to_string_lossy().into_owned(),
            size: m.size,
            error: m.error.to_string(),
        }
    }
}

/// An item that could not be enumerated or stat'ed.
#[derive(Debug, Clone, Serialize)]
pub struct JsonItemError {
    /// Path of the unavailable item
    pub path: String,
    /// `subtree_unavailable` or `metadata_unavailable`
    pub kind: &'static str,
    /// Human-readable message
    pub message: String,
}

impl From<&ScanError> for JsonItemError {
    fn from(e: &ScanError) -> Self {
        Self {
            path: e.path().to_string_lossy().into_owned(),
            kind: "subtree_unavailable",
            message: e.to_string(),
        }
    }
}

impl From<&EntryError> for JsonItemError {
    fn from(e: &EntryError) -> Self {
        let kind = match e {
            EntryError::MetadataUnavailable { .. } => "metadata_unavailable",
            EntryError::ContentUnreadable { .. } => "content_unreadable",
        };
        Self {
            path: e.path().to_string_lossy().into_owned(),
            kind,
            message: e.to_string(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files enumerated under the master root
    pub master_files: usize,
    /// Bytes enumerated under the master root
    pub master_size: u64,
    /// Files enumerated under the slave root
    pub slave_files: usize,
    /// Bytes enumerated under the slave root
    pub slave_size: u64,
    /// Equal-size master/slave pairs
    pub candidate_matches: usize,
    /// Pairs confirmed by digest
    pub verified_matches: usize,
    /// Pairs whose digests differed
    pub distinct_matches: usize,
    /// Duration of the comparison in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "CD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            master_files: summary.master.files,
            master_size: summary.master.total_size,
            slave_files: summary.slave.files,
            slave_size: summary.slave.total_size,
            candidate_matches: summary.candidate_matches,
            verified_matches: summary.verified_matches,
            distinct_matches: summary.distinct_matches,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Verified duplicate pairs, in candidate order
    pub matches: &'a [VerifiedMatch],
    /// Candidates whose digest failed
    pub unverifiable: Vec<JsonUnverifiable>,
    /// Unreadable subtrees and entries without a size
    pub errors: Vec<JsonItemError>,
    /// Totals
    pub summary: JsonSummary,
}

impl<'a> JsonOutput<'a> {
    /// Create a new JSON output from comparison results.
    ///
    /// # Example
    ///
    /// ```
    /// use crossdupe::duplicates::ScanSummary;
    /// use crossdupe::error::ExitCode;
    /// use crossdupe::output::json::JsonOutput;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), ExitCode::NoDuplicates);
    /// assert!(output.matches.is_empty());
    /// assert!(output.to_json().unwrap().starts_with('{'));
    /// ```
    #[must_use]
    pub fn new(matches: &'a [VerifiedMatch], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            matches,
            unverifiable: summary.unverifiable.iter().map(JsonUnverifiable::from).collect(),
            errors: summary
                .scan_errors
                .iter()
                .map(JsonItemError::from)
                .chain(summary.size_failures.iter().map(JsonItemError::from))
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
