//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! Digests are 128 bits: BLAKE3 run in extendable-output mode and truncated
//! to [`DIGEST_LEN`] bytes. Files are read in fixed-size chunks, so hashing a
//! multi-gigabyte file never needs more than [`BUFFER_SIZE`] bytes of memory.
//! An opt-in memory-mapped path exists for large files on fast storage; both
//! paths produce identical digests.

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::EntryError;

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 16;

/// Read buffer size for streamed hashing (64 KiB).
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Default size at which the mmap path kicks in, when enabled (16 MiB).
pub const DEFAULT_MMAP_THRESHOLD: u64 = 16 * 1024 * 1024;

/// Fixed-length fingerprint of a file's full content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes in index order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Digest of an in-memory buffer.
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(data);
        Self::finalize(&hasher)
    }

    fn finalize(hasher: &blake3::Hasher) -> Self {
        let mut out = [0u8; DIGEST_LEN];
        hasher.finalize_xof().fill(&mut out);
        Self(out)
    }

    /// Lowercase hex, two characters per byte, no separators.
    #[must_use]
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        self.0.iter().fold(String::with_capacity(DIGEST_LEN * 2), |mut s, b| {
            let _ = write!(s, "{b:02x}");
            s
        })
    }

    /// Parse the format produced by [`Digest::to_hex`].
    ///
    /// Returns `None` unless the input is exactly 32 lowercase hex characters.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.as_bytes();
        if bytes.len() != DIGEST_LEN * 2 {
            return None;
        }
        let mut out = [0u8; DIGEST_LEN];
        for (byte, pair) in out.iter_mut().zip(bytes.chunks_exact(2)) {
            *byte = (nibble(pair[0])? << 4) | nibble(pair[1])?;
        }
        Some(Self(out))
    }
}

/// Value of one lowercase hex digit.
fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid digest: {s}")))
    }
}

/// Content hasher.
///
/// Stateless apart from its read strategy, so a single instance can be
/// shared across worker threads.
#[derive(Debug, Clone)]
pub struct Hasher {
    use_mmap: bool,
    mmap_threshold: u64,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a streaming hasher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            use_mmap: false,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }

    /// Enable or disable memory-mapped hashing for large files.
    #[must_use]
    pub fn with_mmap(mut self, enabled: bool) -> Self {
        self.use_mmap = enabled;
        self
    }

    /// Minimum file size for the mmap path.
    #[must_use]
    pub fn with_mmap_threshold(mut self, bytes: u64) -> Self {
        self.mmap_threshold = bytes;
        self
    }

    /// Hash the entire content of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::ContentUnreadable`] if the file cannot be opened
    /// or a read fails part way through.
    pub fn full_hash(&self, path: &Path) -> Result<Digest, EntryError> {
        let mut file = File::open(path).map_err(|e| EntryError::content(path, e))?;

        if self.use_mmap {
            let len = file
                .metadata()
                .map_err(|e| EntryError::content(path, e))?
                .len();
            if len >= self.mmap_threshold {
                log::trace!("Hashing via mmap ({} bytes): {}", len, path.display());
                let mut hasher = blake3::Hasher::new();
                hasher
                    .update_mmap_rayon(path)
                    .map_err(|e| EntryError::content(path, e))?;
                return Ok(Digest::finalize(&hasher));
            }
        }

        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(EntryError::content(path, e)),
            };
            hasher.update(&buffer[..n]);
        }
        Ok(Digest::finalize(&hasher))
    }
}
