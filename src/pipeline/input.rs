//! Input loading: workbook bytes → records, PDF files → name map.
//!
//! ## Why bytes, not paths?
//!
//! The record table and the layout PDFs arrive as uploads in the
//! original deployment, so the library core works on in-memory bytes
//! keyed by original filename. [`RunInputs::from_paths`] is the CLI
//! convenience that reads a workbook file and a directory of PDFs into
//! that shape. Pure ingestion: no content is transformed here.

use crate::error::StamperError;
use crate::record::Record;
use calamine::{Data, Reader, Xlsx};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Required workbook columns, in payload order. Case-sensitive.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "EE",
    "Cod Sondaje",
    "Tipo",
    "Target",
    "Veta",
    "Nivel",
    "Labor",
    "Categoria",
    "Inclinacion",
    "Azimut",
];

/// The two inputs of a run: workbook bytes and named PDF bytes.
pub struct RunInputs {
    /// Raw .xlsx bytes of the project workbook.
    pub workbook: Vec<u8>,
    /// Supplied layout PDFs, keyed by original filename.
    pub documents: BTreeMap<String, Vec<u8>>,
}

impl RunInputs {
    /// Read a workbook file and every `*.pdf` in `layouts_dir`.
    pub fn from_paths(
        workbook: impl AsRef<Path>,
        layouts_dir: impl AsRef<Path>,
    ) -> Result<Self, StamperError> {
        let workbook_path = workbook.as_ref();
        let workbook = std::fs::read(workbook_path).map_err(|e| StamperError::WorkbookRead {
            detail: format!("{}: {e}", workbook_path.display()),
        })?;

        let dir = layouts_dir.as_ref();
        let mut documents = BTreeMap::new();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            StamperError::Internal(format!("Failed to read layout dir {}: {e}", dir.display()))
        })?;
        for entry in entries {
            let entry = entry
                .map_err(|e| StamperError::Internal(format!("Failed to read dir entry: {e}")))?;
            let path = entry.path();
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if !is_pdf {
                continue;
            }
            let name = match path.file_name() {
                Some(n) => n.to_string_lossy().into_owned(),
                None => continue,
            };
            let bytes = std::fs::read(&path).map_err(|e| StamperError::PdfOpen {
                name: name.clone(),
                detail: e.to_string(),
            })?;
            documents.insert(name, bytes);
        }

        info!(
            "Loaded workbook ({} bytes) and {} layout PDF(s) from {}",
            workbook.len(),
            documents.len(),
            dir.display()
        );
        Ok(Self {
            workbook,
            documents,
        })
    }
}

/// Parse the workbook into the ordered record sequence.
///
/// Reads `sheet` when given, otherwise the workbook's first worksheet.
/// Missing required columns are reported in aggregate; malformed rows
/// abort the run naming the row and column.
pub fn parse_workbook(bytes: &[u8], sheet: Option<&str>) -> Result<Vec<Record>, StamperError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| StamperError::WorkbookRead {
            detail: e.to_string(),
        })?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| StamperError::WorkbookRead {
                detail: "workbook contains no worksheets".into(),
            })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|_| StamperError::SheetNotFound {
            name: sheet_name.clone(),
        })?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| StamperError::WorkbookRead {
        detail: format!("worksheet '{sheet_name}' is empty"),
    })?;

    let columns = resolve_columns(header)?;

    let mut records = Vec::new();
    for (i, row) in rows.enumerate() {
        // Header is worksheet row 1; data starts at row 2.
        let row_num = i + 2;
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        records.push(parse_row(row, row_num, &columns)?);
    }

    debug!(
        "Parsed {} record(s) from worksheet '{}'",
        records.len(),
        sheet_name
    );
    Ok(records)
}

/// Header-name → column-index mapping for the ten required columns,
/// in [`REQUIRED_COLUMNS`] order. Missing names reported in aggregate.
fn resolve_columns(header: &[Data]) -> Result<[usize; 10], StamperError> {
    let mut indices = [0usize; 10];
    let mut missing = Vec::new();

    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        match header.iter().position(|cell| cell_to_string(cell) == *name) {
            Some(idx) => indices[slot] = idx,
            None => missing.push((*name).to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(StamperError::MissingColumns { columns: missing });
    }
    Ok(indices)
}

fn parse_row(row: &[Data], row_num: usize, columns: &[usize; 10]) -> Result<Record, StamperError> {
    let text = |slot: usize| -> String {
        row.get(columns[slot]).map(cell_to_string).unwrap_or_default()
    };

    let code = text(1).trim().to_string();
    if code.is_empty() {
        return Err(StamperError::EmptyCode { row: row_num });
    }

    Ok(Record {
        row: row_num,
        entity: text(0),
        code,
        kind: text(2),
        target: text(3),
        vein: text(4),
        level: text(5),
        working: text(6),
        category: text(7),
        inclination: cell_to_f64(row.get(columns[8]), row_num, "Inclinacion")?,
        azimuth: cell_to_f64(row.get(columns[9]), row_num, "Azimut")?,
    })
}

/// Cell → plain string. Integer-valued floats coerce to their integer
/// form so a numeric code 1001 names files `1001.png`, never `1001.0`.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        other => other.to_string(),
    }
}

fn cell_to_f64(
    cell: Option<&Data>,
    row: usize,
    column: &str,
) -> Result<f64, StamperError> {
    let malformed = |detail: String| StamperError::MalformedRecord {
        row,
        column: column.to_string(),
        detail,
    };

    match cell {
        Some(Data::Float(v)) => Ok(*v),
        Some(Data::Int(v)) => Ok(*v as f64),
        Some(Data::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| malformed(format!("not a number: '{}'", s.trim()))),
        Some(Data::Empty) | None => Err(malformed("cell is empty".into())),
        Some(other) => Err(malformed(format!("not a number: '{other}'"))),
    }
}
