//! Error types for the ddh-stamper library.
//!
//! One enum covers the whole pipeline. The run is all-or-nothing by
//! design: any error aborts before a bundle is produced (the only
//! soft path is lenient validation, which skips unmatched rows with a
//! warning and is not an error at all). Aggregate conditions — missing
//! layout PDFs, missing workbook columns, duplicated codes — report
//! every offender in one message so the user fixes the input in a
//! single round trip instead of replaying the run per file.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the ddh-stamper library.
#[derive(Debug, Error)]
pub enum StamperError {
    // ── Workbook errors ───────────────────────────────────────────────────
    /// The workbook could not be opened or parsed as .xlsx.
    #[error("Failed to read workbook: {detail}\nCheck the file is a valid .xlsx export.")]
    WorkbookRead { detail: String },

    /// The requested worksheet does not exist (or the workbook has none).
    #[error("Worksheet '{name}' not found in workbook")]
    SheetNotFound { name: String },

    /// One or more required header columns are absent from the sheet.
    #[error("Workbook is missing required column(s): {}\nExpected header row: EE, Cod Sondaje, Tipo, Target, Veta, Nivel, Labor, Categoria, Inclinacion, Azimut", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// A row value could not be interpreted for its column.
    #[error("Row {row}: invalid value for '{column}': {detail}")]
    MalformedRecord {
        row: usize,
        column: String,
        detail: String,
    },

    /// A row has an empty drill-hole code after trimming.
    #[error("Row {row}: 'Cod Sondaje' is empty")]
    EmptyCode { row: usize },

    /// The same code appears on more than one row (strict duplicate policy).
    #[error("Duplicate drill-hole code(s): {}\nCodes must be unique; pass --allow-duplicates to keep the last occurrence.", codes.join(", "))]
    DuplicateCodes { codes: Vec<String> },

    // ── Validation errors ─────────────────────────────────────────────────
    /// Strict mode: one or more expected layout PDFs were not supplied.
    #[error("Missing layout PDF(s):\n{}\nSupply every '<code> Layout.pdf' or run with --lenient to skip unmatched rows.", names.iter().map(|n| format!("  - {n}")).collect::<Vec<_>>().join("\n"))]
    MissingDocuments { names: Vec<String> },

    // ── Label errors ──────────────────────────────────────────────────────
    /// The configured caption font file could not be loaded.
    #[error("Failed to load caption font '{}': {detail}\nOmit --font to use the built-in bitmap font.", path.display())]
    FontLoadFailed { path: PathBuf, detail: String },

    /// The QR payload could not be encoded as a symbol.
    #[error("QR encoding failed for '{code}': {detail}")]
    QrEncodeFailed { code: String, detail: String },

    /// A composed label image could not be written to the working directory.
    #[error("Failed to write label image '{}': {detail}", path.display())]
    ImageWriteFailed { path: PathBuf, detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// A supplied layout PDF could not be parsed.
    #[error("Layout PDF '{name}' is not a readable PDF: {detail}")]
    PdfOpen { name: String, detail: String },

    /// A supplied layout PDF contains no pages to stamp.
    #[error("Layout PDF '{name}' has no pages")]
    PdfNoPages { name: String },

    /// The overlay rectangle falls outside the first page's MediaBox
    /// (only checked when `enforce_page_bounds` is on).
    #[error("Overlay rectangle ({x0}, {y0})–({x1}, {y1}) exceeds the {page_w}x{page_h} page of '{name}'")]
    OverlayOutOfBounds {
        name: String,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        page_w: f32,
        page_h: f32,
    },

    /// Embedding the label image into a page failed.
    #[error("Failed to stamp '{name}': {detail}")]
    StampFailed { name: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output archive.
    #[error("Failed to write archive '{}': {detail}", path.display())]
    ArchiveFailed { path: PathBuf, detail: String },

    /// Could not write a file outside the working directory.
    #[error("Failed to write output file '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_documents_lists_every_name() {
        let e = StamperError::MissingDocuments {
            names: vec!["DDH-001 Layout.pdf".into(), "DDH-002 Layout.pdf".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("DDH-001 Layout.pdf"), "got: {msg}");
        assert!(msg.contains("DDH-002 Layout.pdf"), "got: {msg}");
        assert!(msg.contains("--lenient"));
    }

    #[test]
    fn missing_columns_joins_names() {
        let e = StamperError::MissingColumns {
            columns: vec!["Veta".into(), "Azimut".into()],
        };
        assert!(e.to_string().contains("Veta, Azimut"));
    }

    #[test]
    fn malformed_record_names_row_and_column() {
        let e = StamperError::MalformedRecord {
            row: 7,
            column: "Inclinacion".into(),
            detail: "not a number: 'steep'".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Row 7"));
        assert!(msg.contains("Inclinacion"));
    }

    #[test]
    fn duplicate_codes_display() {
        let e = StamperError::DuplicateCodes {
            codes: vec!["DDH-010".into()],
        };
        assert!(e.to_string().contains("DDH-010"));
    }

    #[test]
    fn overlay_out_of_bounds_display() {
        let e = StamperError::OverlayOutOfBounds {
            name: "A Layout.pdf".into(),
            x0: 600.0,
            y0: 870.0,
            x1: 750.0,
            y1: 1030.0,
            page_w: 595.0,
            page_h: 842.0,
        };
        let msg = e.to_string();
        assert!(msg.contains("595x842"));
        assert!(msg.contains("A Layout.pdf"));
    }
}
