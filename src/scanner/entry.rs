//! A discovered file with lazily computed, memoized attributes.
//!
//! Size and digest are computed on first access and cached for the lifetime
//! of the [`Entry`]. The filesystem is assumed not to change under a single
//! run; a cached value is never recomputed. Failed computations are not
//! cached.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use super::{Digest, EntryError, Hasher};

/// Write-once cell.
///
/// Reads after initialization are lock-free. The first initialization is
/// serialized by `init`, so concurrent callers compute the value once.
#[derive(Debug)]
struct Memo<T> {
    value: OnceLock<T>,
    init: Mutex<()>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            value: OnceLock::new(),
            init: Mutex::new(()),
        }
    }
}

impl<T> Memo<T> {
    fn get(&self) -> Option<&T> {
        self.value.get()
    }

    fn get_or_try_init<E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        // A panicking initializer stored nothing, so the guard is still usable.
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let value = f()?;
        Ok(self.value.get_or_init(move || value))
    }
}

/// One regular file found during enumeration.
#[derive(Debug)]
pub struct Entry {
    path: PathBuf,
    size: Memo<u64>,
    digest: Memo<Digest>,
}

impl Entry {
    /// Create an entry. Nothing is read from disk until an attribute is requested.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: Memo::default(),
            digest: Memo::default(),
        }
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File length in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::MetadataUnavailable`] if the file cannot be
    /// stat'ed. No default is substituted.
    pub fn size(&self) -> Result<u64, EntryError> {
        self.size
            .get_or_try_init(|| {
                log::trace!("stat {}", self.path.display());
                std::fs::metadata(&self.path)
                    .map(|m| m.len())
                    .map_err(|e| EntryError::metadata(&self.path, e))
            })
            .copied()
    }

    /// Content digest using a default streaming [`Hasher`].
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::ContentUnreadable`] if the file cannot be read.
    pub fn digest(&self) -> Result<Digest, EntryError> {
        self.digest_with(&Hasher::new())
    }

    /// Content digest, computed with `hasher` on first access.
    ///
    /// Every hasher read strategy yields the same digest, so the cached value
    /// is valid regardless of which hasher filled it.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::ContentUnreadable`] if the file cannot be read.
    pub fn digest_with(&self, hasher: &Hasher) -> Result<Digest, EntryError> {
        self.digest
            .get_or_try_init(|| {
                log::trace!("hash {}", self.path.display());
                hasher.full_hash(&self.path)
            })
            .copied()
    }

    /// Cached size, if it has been computed.
    #[must_use]
    pub fn cached_size(&self) -> Option<u64> {
        self.size.get().copied()
    }

    /// Cached digest, if it has been computed.
    #[must_use]
    pub fn cached_digest(&self) -> Option<Digest> {
        self.digest.get().copied()
    }

    /// Whether the size has been computed.
    #[must_use]
    pub fn is_size_cached(&self) -> bool {
        self.size.get().is_some()
    }

    /// Whether the digest has been computed.
    #[must_use]
    pub fn is_digest_cached(&self) -> bool {
        self.digest.get().is_some()
    }
}
