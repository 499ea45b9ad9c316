//! # ddh-stamper
//!
//! Generate a QR-coded label for every drill-hole record in an Excel
//! workbook and stamp it onto the matching layout PDF, then bundle the
//! results into one ZIP.
//!
//! ## Why this crate?
//!
//! Drilling ops teams print one layout sheet per hole and annotate it
//! by hand with the hole's metadata. A scannable label removes the
//! transcription step: this crate reads the project workbook, encodes
//! each row's ten metadata fields as a QR symbol with a human-readable
//! caption, and places that label into the sheet's reserved corner —
//! for the whole campaign in one run.
//!
//! ## Pipeline Overview
//!
//! ```text
//! workbook.xlsx + {code} Layout.pdf files
//!  │
//!  ├─ 1. Input     parse records; map filename → PDF bytes
//!  ├─ 2. Validate  duplicate codes, every layout present (all-or-nothing)
//!  ├─ 3. Label     JSON payload → QR symbol + caption on white canvas
//!  ├─ 4. Stamp     embed label at the fixed page rectangle (lopdf)
//!  └─ 5. Bundle    {code}.png + {code} Layout QR.pdf → one ZIP
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ddh_stamper::{run_to_file, RunInputs, StampConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let inputs = RunInputs::from_paths("projects.xlsx", "layouts/")?;
//!     let config = StampConfig::default();
//!     let stats = run_to_file(&inputs, &config, "stamped-layouts.zip")?;
//!     eprintln!("stamped {}/{} records", stats.records_stamped, stats.records_total);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ddh-stamper` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ddh-stamper = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    DuplicatePolicy, OverlayRect, StampConfig, StampConfigBuilder, ValidationMode,
    DEFAULT_OVERLAY,
};
pub use error::StamperError;
pub use output::{RunOutput, RunStats};
pub use pipeline::input::{RunInputs, REQUIRED_COLUMNS};
pub use progress::{NoopProgressCallback, RunProgress, RunProgressCallback};
pub use record::{QrPayload, Record, LAYOUT_SUFFIX, STAMPED_SUFFIX};
pub use run::{preview_label, run, run_to_file};
