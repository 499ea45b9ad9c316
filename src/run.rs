//! Eager run entry points.
//!
//! One record at a time, strictly sequential: parse → validate →
//! compose → stamp, then bundle. There is nothing to parallelise at
//! this data scale — a run is a few dozen records — and the sequential
//! loop keeps failure semantics trivial: strict runs either produce a
//! complete bundle or nothing at all.

use crate::config::{StampConfig, ValidationMode};
use crate::error::StamperError;
use crate::output::{RunOutput, RunStats};
use crate::pipeline::font::CaptionFont;
use crate::pipeline::input::{self, RunInputs};
use crate::pipeline::{label, stamp, validate};
use crate::record::Record;
use image::RgbImage;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;
use tempfile::TempDir;
use tracing::{info, warn};

/// Process every record and return the run's outputs, still in the
/// scoped working directory.
///
/// This is the primary entry point for the library; call
/// [`RunOutput::write_bundle`] (or [`run_to_file`]) to persist the ZIP.
///
/// # Errors
/// Any error aborts the run before a bundle exists: unreadable
/// workbook, missing columns, malformed rows, duplicate codes (under
/// the default policy), missing layout PDFs (strict mode), and any
/// label/stamp/I-O failure mid-loop. The working directory is removed
/// on every exit path.
pub fn run(inputs: &RunInputs, config: &StampConfig) -> Result<RunOutput, StamperError> {
    let total_start = Instant::now();

    // ── Step 1: Parse the workbook ───────────────────────────────────────
    let records = input::parse_workbook(&inputs.workbook, config.sheet.as_deref())?;
    info!("Workbook has {} record(s)", records.len());

    // ── Step 2: Pre-flight validation ────────────────────────────────────
    validate::check_duplicates(&records, config.duplicates)?;

    let missing = validate::missing_documents(&records, &inputs.documents);
    let skip_names: BTreeSet<String> = match config.validation {
        ValidationMode::Strict if !missing.is_empty() => {
            return Err(StamperError::MissingDocuments { names: missing });
        }
        ValidationMode::Strict => BTreeSet::new(),
        ValidationMode::Lenient => {
            for name in &missing {
                warn!("Layout PDF not supplied, skipping: {name}");
            }
            missing.into_iter().collect()
        }
    };

    // ── Step 3: Resolve the caption font once ────────────────────────────
    let font = CaptionFont::resolve(config.font.as_deref(), config.caption_scale)?;

    // ── Step 4: Compose and stamp, one record at a time ──────────────────
    let workdir = TempDir::new().map_err(|e| StamperError::Internal(e.to_string()))?;
    let total = records.len();
    if let Some(ref cb) = config.progress {
        cb.on_run_start(total);
    }

    let mut labels = Vec::new();
    let mut documents = Vec::new();
    let mut skipped = Vec::new();
    let mut label_duration_ms = 0u64;
    let mut stamp_duration_ms = 0u64;

    for (i, record) in records.iter().enumerate() {
        let index = i + 1;
        let layout_name = record.layout_name();

        if skip_names.contains(&layout_name) {
            if let Some(ref cb) = config.progress {
                cb.on_record_skipped(index, total, &record.code);
            }
            skipped.push(record.code.clone());
            continue;
        }
        if let Some(ref cb) = config.progress {
            cb.on_record_start(index, total, &record.code);
        }

        // Compose and persist the label image.
        let label_start = Instant::now();
        let label_img = label::compose_label(record, &font, config.qr_module_px)?;
        let label_path = workdir.path().join(record.image_name());
        label_img
            .save(&label_path)
            .map_err(|e| StamperError::ImageWriteFailed {
                path: label_path.clone(),
                detail: e.to_string(),
            })?;
        label_duration_ms += label_start.elapsed().as_millis() as u64;

        // Stamp the matching layout PDF. The document is guaranteed
        // present here: strict mode already halted on any shortfall and
        // lenient mode filtered unmatched rows above.
        let pdf_bytes = inputs
            .documents
            .get(&layout_name)
            .ok_or_else(|| StamperError::Internal(format!("document vanished: {layout_name}")))?;
        let stamped_path = workdir.path().join(record.stamped_name());

        let stamp_start = Instant::now();
        stamp::stamp_document(
            &layout_name,
            pdf_bytes,
            &label_path,
            &config.overlay,
            config.enforce_page_bounds,
            &stamped_path,
        )?;
        stamp_duration_ms += stamp_start.elapsed().as_millis() as u64;

        if let Some(ref cb) = config.progress {
            cb.on_record_stamped(index, total, &record.code);
        }

        // Duplicate codes under LastWins overwrite the same paths on
        // disk; keep the manifests deduplicated to match.
        if !labels.contains(&label_path) {
            labels.push(label_path);
            documents.push(stamped_path);
        }
    }

    let stats = RunStats {
        records_total: total,
        records_stamped: documents.len(),
        records_skipped: skipped.len(),
        label_duration_ms,
        stamp_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    if let Some(ref cb) = config.progress {
        cb.on_run_complete(stats.records_stamped, stats.records_skipped);
    }
    info!(
        "Run complete: {}/{} record(s) stamped, {} skipped, {}ms total",
        stats.records_stamped, stats.records_total, stats.records_skipped, stats.total_duration_ms
    );

    Ok(RunOutput {
        labels,
        documents,
        skipped,
        stats,
        _workdir: workdir,
    })
}

/// Run the pipeline and write the bundle ZIP to `zip_path`.
///
/// The bundle write is atomic (temp file + rename), so a failed run
/// never leaves a truncated archive behind.
pub fn run_to_file(
    inputs: &RunInputs,
    config: &StampConfig,
    zip_path: impl AsRef<Path>,
) -> Result<RunStats, StamperError> {
    let output = run(inputs, config)?;
    output.write_bundle(zip_path.as_ref())?;
    Ok(output.stats)
}

/// Compose one record's label in memory, without touching any PDF.
///
/// Backs the "preview one record before running everything" affordance
/// of the upload surface and the CLI's `--preview` flag.
pub fn preview_label(record: &Record, config: &StampConfig) -> Result<RgbImage, StamperError> {
    let font = CaptionFont::resolve(config.font.as_deref(), config.caption_scale)?;
    label::compose_label(record, &font, config.qr_module_px)
}
