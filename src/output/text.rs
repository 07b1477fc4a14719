//! Human-readable report of a comparison.
//!
//! ```text
//! found 5 files, total size: 30 B
//!   master: 2 files, 15 B
//!   slave: 3 files, 15 B
//! found 3 potential matches
//! found 2 verified matches
//! 6437b3ac38465133ffb63b75273a8db5  /m/a.txt == /s/b.txt
//! ```
//!
//! Items that could not be read follow as `unverifiable:` and
//! `unavailable:` lines.

use std::fmt::Write as _;
use std::io::{self, Write};

use bytesize::ByteSize;

use crate::duplicates::{ScanSummary, VerifiedMatch};

/// Plain text formatter.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    matches: &'a [VerifiedMatch],
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter over comparison results.
    #[must_use]
    pub fn new(matches: &'a [VerifiedMatch], summary: &'a ScanSummary) -> Self {
        Self { matches, summary }
    }

    /// Render the full report.
    #[must_use]
    pub fn render(&self) -> String {
        let s = self.summary;
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "found {} files, total size: {}",
            s.total_files(),
            s.total_size_display()
        );
        let _ = writeln!(
            out,
            "  master: {} files, {}",
            s.master.files,
            ByteSize::b(s.master.total_size)
        );
        let _ = writeln!(
            out,
            "  slave: {} files, {}",
            s.slave.files,
            ByteSize::b(s.slave.total_size)
        );
        let _ = writeln!(out, "found {} potential matches", s.candidate_matches);
        let _ = writeln!(out, "found {} verified matches", s.verified_matches);

        for m in self.matches {
            let _ = writeln!(
                out,
                "{}  {} == {}",
                m.digest,
                m.master.display(),
                m.slave.display()
            );
        }
        for u in &s.unverifiable {
            let _ = writeln!(
                out,
                "unverifiable: {} == {}: {}",
                u.master.display(),
                u.slave.display(),
                u.error
            );
        }
        for e in &s.scan_errors {
            let _ = writeln!(out, "unavailable: {e}");
        }
        for e in &s.size_failures {
            let _ = writeln!(out, "unavailable: {e}");
        }
        out
    }

    /// Write the report to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.render().as_bytes())
    }
}
