//! Run outputs: the two-part manifest and run statistics.
//!
//! Labels and stamped documents are tracked in separate lists rather
//! than one flat path accumulator. The archive itself stays flat (base
//! filenames only, as downstream tooling expects), but with a two-part
//! manifest a name collision between an image and a document is
//! structurally impossible instead of silently resolved by overwrite.

use crate::error::StamperError;
use crate::pipeline::archive;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Everything a run produced, still living in the scoped working
/// directory.
///
/// The `TempDir` is held here so the files survive until the caller has
/// written the bundle (or copied what it wants); dropping the
/// `RunOutput` deletes the working directory, on every exit path.
pub struct RunOutput {
    /// Composed label images, one `{code}.png` per stamped record.
    pub labels: Vec<PathBuf>,
    /// Stamped documents, one `{code} Layout QR.pdf` per stamped record.
    pub documents: Vec<PathBuf>,
    /// Codes skipped in lenient mode (no layout PDF supplied).
    pub skipped: Vec<String>,
    /// Counters and timings for the run.
    pub stats: RunStats,
    /// Scoped working directory holding every path above.
    pub(crate) _workdir: TempDir,
}

impl RunOutput {
    /// Write every label and stamped document into one ZIP archive.
    ///
    /// Entries use base filenames only. The write is atomic: the
    /// archive is assembled next to `path` and renamed into place, so a
    /// failed run never leaves a truncated bundle behind.
    pub fn write_bundle(&self, path: impl AsRef<Path>) -> Result<(), StamperError> {
        let path = path.as_ref();
        let tmp = path.with_extension("zip.tmp");

        archive::write_archive(&tmp, &self.labels, &self.documents)?;

        std::fs::rename(&tmp, path).map_err(|source| StamperError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of archive entries a bundle of this output will contain.
    pub fn bundle_len(&self) -> usize {
        self.labels.len() + self.documents.len()
    }
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Records parsed from the workbook.
    pub records_total: usize,
    /// Records whose label was composed and stamped.
    pub records_stamped: usize,
    /// Records skipped in lenient mode.
    pub records_skipped: usize,
    /// Time spent composing label images, in milliseconds.
    pub label_duration_ms: u64,
    /// Time spent stamping and saving PDFs, in milliseconds.
    pub stamp_duration_ms: u64,
    /// Wall-clock time for the whole run, in milliseconds.
    pub total_duration_ms: u64,
}
