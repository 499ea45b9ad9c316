//! Output bundling: every label and stamped PDF into one ZIP.
//!
//! Entries are written by base filename (flat namespace, as the
//! download surface expects a flat archive). Labels are written first,
//! then documents; the two manifests can never collide because their
//! naming conventions differ (`{code}.png` vs `{code} Layout QR.pdf`).

use crate::error::StamperError;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write `labels` then `documents` into a ZIP at `path`.
pub fn write_archive(
    path: &Path,
    labels: &[PathBuf],
    documents: &[PathBuf],
) -> Result<(), StamperError> {
    let failed = |detail: String| StamperError::ArchiveFailed {
        path: path.to_path_buf(),
        detail,
    };

    let file = File::create(path).map_err(|e| failed(e.to_string()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in labels.iter().chain(documents.iter()) {
        let name = entry
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| failed(format!("output path has no filename: {}", entry.display())))?;

        zip.start_file(name.as_str(), options)
            .map_err(|e| failed(format!("{name}: {e}")))?;
        let mut src = File::open(entry).map_err(|e| failed(format!("{name}: {e}")))?;
        io::copy(&mut src, &mut zip).map_err(|e| failed(format!("{name}: {e}")))?;
    }

    zip.finish().map_err(|e| failed(e.to_string()))?;
    debug!(
        "Archived {} entries → {}",
        labels.len() + documents.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(contents).unwrap();
        path
    }

    #[test]
    fn archive_holds_labels_then_documents_by_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let labels = vec![
            write_file(dir.path(), "A.png", b"png-a"),
            write_file(dir.path(), "B.png", b"png-b"),
        ];
        let documents = vec![
            write_file(dir.path(), "A Layout QR.pdf", b"pdf-a"),
            write_file(dir.path(), "B Layout QR.pdf", b"pdf-b"),
        ];
        let zip_path = dir.path().join("bundle.zip");

        write_archive(&zip_path, &labels, &documents).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 4);
        let names: BTreeSet<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        let expected: BTreeSet<String> = ["A.png", "B.png", "A Layout QR.pdf", "B Layout QR.pdf"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn empty_manifests_make_an_empty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("bundle.zip");
        write_archive(&zip_path, &[], &[]).unwrap();

        let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn missing_source_file_is_an_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("bundle.zip");
        let err = write_archive(&zip_path, &[dir.path().join("ghost.png")], &[]).unwrap_err();
        assert!(matches!(err, StamperError::ArchiveFailed { .. }));
    }
}
