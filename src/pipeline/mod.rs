//! Pipeline stages for workbook-to-bundle stamping.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets
//! us swap implementations (e.g. a different PDF backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ validate ──▶ label ──▶ stamp ──▶ archive
//! (xlsx+pdfs) (complete?) (QR+caption) (overlay)  (zip)
//! ```
//!
//! 1. [`input`]    — parse the workbook into records; collect supplied
//!    PDFs into a name → bytes map
//! 2. [`validate`] — duplicate-code and completeness preconditions,
//!    before any output is produced
//! 3. [`font`]     — resolve the caption font once per run
//! 4. [`label`]    — encode the QR payload and compose the caption+QR
//!    image for one record
//! 5. [`stamp`]    — embed the label into the fixed rectangle on page
//!    one of the matching PDF
//! 6. [`archive`]  — bundle every label and stamped PDF into one ZIP

pub mod archive;
pub mod font;
pub mod input;
pub mod label;
pub mod stamp;
pub mod validate;
