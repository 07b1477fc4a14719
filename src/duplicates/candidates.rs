//! Candidate matching by file size.
//!
//! # Overview
//!
//! Files of different sizes cannot be duplicates, so the first phase pairs
//! master and slave entries only when their sizes are equal. The slave
//! collection is bucketed by size and each master entry is paired with its
//! bucket, which costs O(|master| + |slave| + |matches|) instead of the full
//! cross product while producing the same pairs in the same order.
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::duplicates::find_candidates;
//! use crossdupe::scanner::Entry;
//!
//! let master = vec![Entry::new("/master/a.jpg")];
//! let slave = vec![Entry::new("/slave/b.jpg"), Entry::new("/slave/c.jpg")];
//!
//! let candidates = find_candidates(&master, &slave);
//! println!("{} potential matches", candidates.len());
//! ```

use std::collections::HashMap;

use crate::scanner::{Entry, EntryError};

/// A master/slave pair with equal sizes. Content not yet compared.
#[derive(Debug, Clone, Copy)]
pub struct CandidateMatch<'a> {
    /// Entry from the master collection
    pub master: &'a Entry,
    /// Entry from the slave collection
    pub slave: &'a Entry,
    /// Size shared by both entries
    pub size: u64,
}

/// Output of candidate matching.
#[derive(Debug, Default)]
pub struct CandidateSet<'a> {
    /// Pairs in master-major order (master walk order, then slave walk order).
    pub matches: Vec<CandidateMatch<'a>>,
    /// Entries whose size could not be determined. Never paired.
    pub size_failures: Vec<EntryError>,
}

impl CandidateSet<'_> {
    /// Number of candidate pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether no pairs were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// One size query per entry of a collection, in collection order.
///
/// Failed queries are not memoized by [`Entry`], so every consumer of a
/// collection's sizes should share one of these.
#[derive(Debug, Default)]
pub struct SizedEntries<'a> {
    /// Entries whose size is known, with that size.
    pub sized: Vec<(&'a Entry, u64)>,
    /// Entries whose size could not be determined.
    pub failures: Vec<EntryError>,
}

impl<'a> SizedEntries<'a> {
    /// Query the size of every entry once.
    #[must_use]
    pub fn collect(entries: &'a [Entry]) -> Self {
        let mut out = Self {
            sized: Vec::with_capacity(entries.len()),
            failures: Vec::new(),
        };
        for entry in entries {
            match entry.size() {
                Ok(size) => out.sized.push((entry, size)),
                Err(e) => {
                    log::warn!("{}", e);
                    out.failures.push(e);
                }
            }
        }
        out
    }

    /// Number of entries queried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sized.len() + self.failures.len()
    }

    /// Whether the collection was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the known sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.sized.iter().map(|&(_, size)| size).sum()
    }
}

/// Pair every master entry with every slave entry of the same size.
///
/// Sizes are taken from each entry's memoized size, so entries already
/// stat'ed are not queried again. Entries from the same collection are
/// never paired with each other.
#[must_use]
pub fn find_candidates<'a>(master: &'a [Entry], slave: &'a [Entry]) -> CandidateSet<'a> {
    match_sized(&SizedEntries::collect(master), &SizedEntries::collect(slave))
}

/// [`find_candidates`] over sizes that were already queried.
///
/// Entries in either `failures` list are reported in
/// [`CandidateSet::size_failures`] and never paired.
#[must_use]
pub fn match_sized<'a>(master: &SizedEntries<'a>, slave: &SizedEntries<'a>) -> CandidateSet<'a> {
    let mut set = CandidateSet {
        matches: Vec::new(),
        size_failures: master.failures.iter().chain(&slave.failures).cloned().collect(),
    };

    let mut buckets: HashMap<u64, Vec<&'a Entry>> = HashMap::new();
    for &(entry, size) in &slave.sized {
        buckets.entry(size).or_default().push(entry);
    }

    for &(entry, size) in &master.sized {
        if let Some(bucket) = buckets.get(&size) {
            set.matches
                .extend(bucket.iter().map(|&slave| CandidateMatch {
                    master: entry,
                    slave,
                    size,
                }));
        }
    }

    log::info!(
        "Size matching: {} master x {} slave files -> {} candidates ({} slave sizes)",
        master.len(),
        slave.len(),
        set.matches.len(),
        buckets.len()
    );

    set
}
