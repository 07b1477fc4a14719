//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based candidate matching between master and slave (Phase 1)
//! - Full digest verification of candidates (Phase 2)
//! - Pipeline orchestration and summary statistics

pub mod candidates;
pub mod finder;
pub mod verify;

pub use candidates::{find_candidates, match_sized, CandidateMatch, CandidateSet, SizedEntries};
pub use finder::{
    check_root, CollectionStats, DuplicateFinder, FinderConfig, FinderError, ScanSummary,
};
pub use verify::{
    verify, verify_candidates, UnverifiableMatch, Verification, VerificationReport,
    VerifiedMatch, VerifyConfig,
};
