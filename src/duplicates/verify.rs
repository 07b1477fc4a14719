//! Content verification of candidate matches.
//!
//! # Overview
//!
//! A candidate is a confirmed duplicate only when both entries' digests are
//! byte-for-byte equal. Digest computation is the dominant cost and is
//! independent per entry, so [`verify_candidates`] spreads it across a
//! bounded rayon pool. Entries shared by several candidates are hashed once;
//! the per-entry memo serializes concurrent first access.
//!
//! Every candidate ends up in exactly one bucket: verified, distinct, or
//! unverifiable.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use super::candidates::{CandidateMatch, CandidateSet};
use crate::progress::{ProgressCallback, PHASE_VERIFY};
use crate::scanner::{Digest, EntryError, Hasher};

/// Outcome of verifying one candidate.
#[derive(Debug, Clone)]
pub enum Verification {
    /// Both digests are equal.
    Duplicate(Digest),
    /// Digests differ.
    Distinct,
    /// A digest could not be computed; no conclusion is drawn.
    Unverifiable(EntryError),
}

impl Verification {
    /// Whether the candidate was confirmed as a duplicate.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Compare the full content digests of a candidate pair.
///
/// The only side effect is filling each entry's digest cache.
#[must_use]
pub fn verify(candidate: &CandidateMatch<'_>, hasher: &Hasher) -> Verification {
    let master = match candidate.master.digest_with(hasher) {
        Ok(digest) => digest,
        Err(e) => return Verification::Unverifiable(e),
    };
    let slave = match candidate.slave.digest_with(hasher) {
        Ok(digest) => digest,
        Err(e) => return Verification::Unverifiable(e),
    };

    if master == slave {
        Verification::Duplicate(master)
    } else {
        Verification::Distinct
    }
}

/// A confirmed duplicate pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedMatch {
    /// Path in the master collection
    pub master: PathBuf,
    /// Path in the slave collection
    pub slave: PathBuf,
    /// Shared file size in bytes
    pub size: u64,
    /// Shared content digest
    pub digest: Digest,
}

/// A candidate that could not be verified.
#[derive(Debug, Clone)]
pub struct UnverifiableMatch {
    /// Path in the master collection
    pub master: PathBuf,
    /// Path in the slave collection
    pub slave: PathBuf,
    /// Shared file size in bytes
    pub size: u64,
    /// The digest failure
    pub error: EntryError,
}

/// Configuration for the verification phase.
#[derive(Clone)]
pub struct VerifyConfig {
    /// Number of worker threads computing digests.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Hasher used for digests.
    pub hasher: Hasher,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for VerifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyConfig")
            .field("io_threads", &self.io_threads)
            .field("hasher", &self.hasher)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            hasher: Hasher::new(),
            progress_callback: None,
        }
    }
}

impl VerifyConfig {
    /// Set the worker thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Results of verifying a candidate set.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    /// Confirmed duplicates, in candidate order.
    pub verified: Vec<VerifiedMatch>,
    /// Number of candidates whose digests differed.
    pub distinct: usize,
    /// Candidates that could not be verified, in candidate order.
    pub unverifiable: Vec<UnverifiableMatch>,
}

impl VerificationReport {
    /// Total candidates accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.verified.len() + self.distinct + self.unverifiable.len()
    }
}

/// Verify every candidate in `candidates`.
///
/// Runs on a dedicated pool of `io_threads` workers; if the pool cannot be
/// built the global rayon pool is used instead. Output order follows the
/// candidate order regardless of scheduling.
#[must_use]
pub fn verify_candidates(candidates: &CandidateSet<'_>, config: &VerifyConfig) -> VerificationReport {
    let mut report = VerificationReport::default();
    if candidates.is_empty() {
        log::debug!("Verification: No candidates to verify");
        return report;
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_VERIFY, candidates.len());
    }
    log::info!(
        "Verification: Comparing digests for {} candidates",
        candidates.len()
    );

    let done = AtomicUsize::new(0);
    let run = || -> Vec<Verification> {
        candidates
            .matches
            .par_iter()
            .map(|candidate| {
                let outcome = verify(candidate, &config.hasher);
                if let Some(ref callback) = config.progress_callback {
                    let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                    callback.on_progress(current, &candidate.slave.path().to_string_lossy());
                }
                outcome
            })
            .collect()
    };

    let outcomes = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads)
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(e) => {
            log::warn!(
                "Failed to create verification thread pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            run()
        }
    };

    for (candidate, outcome) in candidates.matches.iter().zip(outcomes) {
        match outcome {
            Verification::Duplicate(digest) => {
                log::debug!(
                    "Duplicate {}: {} == {}",
                    digest,
                    candidate.master.path().display(),
                    candidate.slave.path().display()
                );
                report.verified.push(VerifiedMatch {
                    master: candidate.master.path().to_path_buf(),
                    slave: candidate.slave.path().to_path_buf(),
                    size: candidate.size,
                    digest,
                });
            }
            Verification::Distinct => report.distinct += 1,
            Verification::Unverifiable(error) => {
                log::warn!("Cannot verify candidate: {}", error);
                report.unverifiable.push(UnverifiableMatch {
                    master: candidate.master.path().to_path_buf(),
                    slave: candidate.slave.path().to_path_buf(),
                    size: candidate.size,
                    error,
                });
            }
        }
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_VERIFY);
    }
    log::info!(
        "Verification complete: {} verified, {} distinct, {} unverifiable",
        report.verified.len(),
        report.distinct,
        report.unverifiable.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::find_candidates;
    use crate::scanner::Entry;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn create_entry(dir: &TempDir, name: &str, content: &[u8]) -> Entry {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        Entry::new(path)
    }

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl ProgressCallback for RecordingCallback {
        fn on_phase_start(&self, phase: &str, total: usize) {
            self.events.lock().unwrap().push(format!("start {phase} {total}"));
        }
        fn on_progress(&self, _current: usize, _path: &str) {
            self.events.lock().unwrap().push("progress".to_string());
        }
        fn on_phase_end(&self, phase: &str) {
            self.events.lock().unwrap().push(format!("end {phase}"));
        }
    }

    #[test]
    fn test_verify_duplicate() {
        let dir = TempDir::new().unwrap();
        let a = create_entry(&dir, "a", b"abc");
        let b = create_entry(&dir, "b", b"abc");
        let candidate = CandidateMatch {
            master: &a,
            slave: &b,
            size: 3,
        };

        match verify(&candidate, &Hasher::new()) {
            Verification::Duplicate(d) => assert_eq!(d, Digest::of(b"abc")),
            other => panic!("Expected Duplicate, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_distinct() {
        let dir = TempDir::new().unwrap();
        let a = create_entry(&dir, "a", b"abc");
        let c = create_entry(&dir, "c", b"xyz");
        let candidate = CandidateMatch {
            master: &a,
            slave: &c,
            size: 3,
        };

        assert!(matches!(
            verify(&candidate, &Hasher::new()),
            Verification::Distinct
        ));
    }

    #[test]
    fn test_verify_unreadable_is_unverifiable() {
        let dir = TempDir::new().unwrap();
        let a = create_entry(&dir, "a", b"abc");
        let gone = Entry::new(dir.path().join("gone"));
        let candidate = CandidateMatch {
            master: &a,
            slave: &gone,
            size: 3,
        };

        match verify(&candidate, &Hasher::new()) {
            Verification::Unverifiable(EntryError::ContentUnreadable { path, .. }) => {
                assert_eq!(path, dir.path().join("gone"));
            }
            other => panic!("Expected Unverifiable, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_candidates_buckets_every_candidate() {
        let dir = TempDir::new().unwrap();
        let master = vec![create_entry(&dir, "m_a", b"abc")];
        let slave = vec![
            create_entry(&dir, "s_b", b"abc"),
            create_entry(&dir, "s_c", b"xyz"),
            create_entry(&dir, "s_d", b"abc"),
        ];
        let candidates = find_candidates(&master, &slave);
        fs::remove_file(slave[2].path()).unwrap();

        let report = verify_candidates(&candidates, &VerifyConfig::default());

        assert_eq!(report.total(), 3);
        assert_eq!(report.verified.len(), 1);
        assert_eq!(report.verified[0].slave, dir.path().join("s_b"));
        assert_eq!(report.distinct, 1);
        assert_eq!(report.unverifiable.len(), 1);
        assert_eq!(report.unverifiable[0].slave, dir.path().join("s_d"));
    }

    #[test]
    fn test_verify_candidates_preserves_order() {
        let dir = TempDir::new().unwrap();
        let master: Vec<Entry> = (0..6)
            .map(|i| create_entry(&dir, &format!("m{i}"), b"same"))
            .collect();
        let slave: Vec<Entry> = (0..6)
            .map(|i| create_entry(&dir, &format!("s{i}"), b"same"))
            .collect();
        let candidates = find_candidates(&master, &slave);

        let report = verify_candidates(&candidates, &VerifyConfig::default().with_io_threads(3));

        assert_eq!(report.verified.len(), 36);
        for (i, m) in report.verified.iter().enumerate() {
            assert_eq!(m.master, dir.path().join(format!("m{}", i / 6)));
            assert_eq!(m.slave, dir.path().join(format!("s{}", i % 6)));
        }
        // Each entry hashed once and cached.
        assert!(master.iter().chain(&slave).all(Entry::is_digest_cached));
    }

    #[test]
    fn test_verify_candidates_reports_progress() {
        let dir = TempDir::new().unwrap();
        let master = vec![create_entry(&dir, "m", b"abc")];
        let slave = vec![create_entry(&dir, "s1", b"abc"), create_entry(&dir, "s2", b"abd")];
        let candidates = find_candidates(&master, &slave);

        let callback = Arc::new(RecordingCallback::default());
        let config = VerifyConfig::default().with_progress_callback(callback.clone());
        let _ = verify_candidates(&candidates, &config);

        let events = callback.events.lock().unwrap();
        assert_eq!(events.first().unwrap(), "start verify 2");
        assert_eq!(events.last().unwrap(), "end verify");
        assert_eq!(events.iter().filter(|e| *e == "progress").count(), 2);
    }

    #[test]
    fn test_verify_candidates_empty() {
        let report = verify_candidates(&CandidateSet::default(), &VerifyConfig::default());
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_verify_config_min_threads() {
        assert_eq!(VerifyConfig::default().with_io_threads(0).io_threads, 1);
    }
}
