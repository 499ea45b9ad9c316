//! Configuration types for a stamping run.
//!
//! All run behaviour is controlled through [`StampConfig`], built via
//! its [`StampConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share a config between the CLI and library callers and
//! to diff two runs to understand why their bundles differ.
//!
//! Two knobs resolve ambiguities observed in earlier revisions of this
//! tool and are therefore explicit rather than implied:
//!
//! * [`ValidationMode`] — halt on any missing layout PDF (strict), or
//!   skip unmatched rows with a warning (lenient).
//! * [`DuplicatePolicy`] — reject duplicated drill-hole codes upfront,
//!   or let the last occurrence overwrite earlier outputs.

use crate::error::StamperError;
use crate::progress::RunProgress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default overlay rectangle in page coordinates: x0, y0, x1, y1.
///
/// Matches the region reserved for the QR label on the standard layout
/// sheet. Constant across all documents; never derived from page size.
pub const DEFAULT_OVERLAY: (f32, f32, f32, f32) = (600.0, 870.0, 750.0, 1030.0);

/// Configuration for a stamping run.
///
/// Built via [`StampConfig::builder()`] or [`StampConfig::default()`].
///
/// # Example
/// ```rust
/// use ddh_stamper::{StampConfig, ValidationMode};
///
/// let config = StampConfig::builder()
///     .validation(ValidationMode::Lenient)
///     .qr_module_px(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct StampConfig {
    /// How to treat records whose layout PDF was not supplied. Default: strict.
    pub validation: ValidationMode,

    /// How to treat repeated drill-hole codes. Default: reject.
    pub duplicates: DuplicatePolicy,

    /// Rectangle on page one that receives the label, in the page's own
    /// coordinate space. Default: [`DEFAULT_OVERLAY`]. The same literal
    /// rectangle is used for every document; pages with unexpected
    /// dimensions get a misplaced or clipped label unless
    /// [`enforce_page_bounds`](Self::enforce_page_bounds) is on.
    pub overlay: OverlayRect,

    /// Reject documents whose first-page MediaBox does not contain the
    /// overlay rectangle. Default: false (place literally, as the
    /// layout sheets have always been stamped).
    pub enforce_page_bounds: bool,

    /// TrueType font file for the caption. `None` uses the built-in
    /// bitmap font. Resolved once at run start; a path that fails to
    /// load is an error, never a silent fallback.
    pub font: Option<PathBuf>,

    /// Caption pixel height for a TrueType font. Default: 28.0.
    /// The built-in font scales to the nearest 8 px multiple.
    pub caption_scale: f32,

    /// Pixels per QR module. Default: 8. Error-correction level and
    /// symbol version are left to the QR library's defaults.
    pub qr_module_px: u32,

    /// Worksheet to read. `None` reads the workbook's first sheet.
    pub sheet: Option<String>,

    /// Optional per-record progress callback.
    pub progress: Option<RunProgress>,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            validation: ValidationMode::Strict,
            duplicates: DuplicatePolicy::Reject,
            overlay: OverlayRect::default(),
            enforce_page_bounds: false,
            font: None,
            caption_scale: 28.0,
            qr_module_px: 8,
            sheet: None,
            progress: None,
        }
    }
}

impl fmt::Debug for StampConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StampConfig")
            .field("validation", &self.validation)
            .field("duplicates", &self.duplicates)
            .field("overlay", &self.overlay)
            .field("enforce_page_bounds", &self.enforce_page_bounds)
            .field("font", &self.font)
            .field("caption_scale", &self.caption_scale)
            .field("qr_module_px", &self.qr_module_px)
            .field("sheet", &self.sheet)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn RunProgressCallback>"))
            .finish()
    }
}

impl StampConfig {
    /// Create a new builder for `StampConfig`.
    pub fn builder() -> StampConfigBuilder {
        StampConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`StampConfig`].
#[derive(Debug)]
pub struct StampConfigBuilder {
    config: StampConfig,
}

impl StampConfigBuilder {
    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.config.validation = mode;
        self
    }

    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.config.duplicates = policy;
        self
    }

    pub fn overlay(mut self, rect: OverlayRect) -> Self {
        self.config.overlay = rect;
        self
    }

    pub fn enforce_page_bounds(mut self, v: bool) -> Self {
        self.config.enforce_page_bounds = v;
        self
    }

    pub fn font(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font = Some(path.into());
        self
    }

    pub fn caption_scale(mut self, px: f32) -> Self {
        self.config.caption_scale = px.clamp(8.0, 120.0);
        self
    }

    pub fn qr_module_px(mut self, px: u32) -> Self {
        self.config.qr_module_px = px.clamp(1, 32);
        self
    }

    pub fn sheet(mut self, name: impl Into<String>) -> Self {
        self.config.sheet = Some(name.into());
        self
    }

    pub fn progress(mut self, cb: RunProgress) -> Self {
        self.config.progress = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<StampConfig, StamperError> {
        let c = &self.config;
        if !c.overlay.is_valid() {
            return Err(StamperError::InvalidConfig(format!(
                "Overlay rectangle must have positive area, got ({}, {})–({}, {})",
                c.overlay.x0, c.overlay.y0, c.overlay.x1, c.overlay.y1
            )));
        }
        if c.qr_module_px == 0 {
            return Err(StamperError::InvalidConfig(
                "QR module size must be ≥ 1 px".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums & geometry ─────────────────────────────────────────────────────

/// Policy for records whose layout PDF was not supplied.
///
/// Earlier revisions of this tool disagreed: one halted the whole run
/// on any missing PDF, the other skipped the row with a warning. Both
/// behaviours are useful — strict for final production runs, lenient
/// while layouts are still trickling in — so the choice is explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValidationMode {
    /// Report every missing layout PDF and halt before producing any
    /// output. (default)
    #[default]
    Strict,
    /// Skip each unmatched record with a warning and continue.
    Lenient,
}

/// Policy for repeated drill-hole codes in the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Treat `code` as a unique key: abort listing every duplicated
    /// code before any processing. (default)
    #[default]
    Reject,
    /// Process every row; a later row with the same code overwrites the
    /// earlier row's label and stamped PDF.
    LastWins,
}

/// Axis-aligned rectangle in a page's own coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Default for OverlayRect {
    fn default() -> Self {
        let (x0, y0, x1, y1) = DEFAULT_OVERLAY;
        Self { x0, y0, x1, y1 }
    }
}

impl OverlayRect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Whether the rectangle lies inside a `w` × `h` page anchored at
    /// the origin.
    pub fn fits_page(&self, w: f32, h: f32) -> bool {
        self.x0 >= 0.0 && self.y0 >= 0.0 && self.x1 <= w && self.y1 <= h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_layout_sheet() {
        let c = StampConfig::default();
        assert_eq!(c.validation, ValidationMode::Strict);
        assert_eq!(c.duplicates, DuplicatePolicy::Reject);
        assert_eq!(c.overlay, OverlayRect::new(600.0, 870.0, 750.0, 1030.0));
        assert_eq!(c.overlay.width(), 150.0);
        assert_eq!(c.overlay.height(), 160.0);
        assert!(!c.enforce_page_bounds);
    }

    #[test]
    fn builder_rejects_degenerate_overlay() {
        let err = StampConfig::builder()
            .overlay(OverlayRect::new(100.0, 100.0, 100.0, 200.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, StamperError::InvalidConfig(_)));
    }

    #[test]
    fn builder_clamps_qr_module_px() {
        let c = StampConfig::builder().qr_module_px(500).build().unwrap();
        assert_eq!(c.qr_module_px, 32);
    }

    #[test]
    fn overlay_fits_page() {
        let r = OverlayRect::default();
        assert!(r.fits_page(842.0, 1191.0)); // A3 portrait in points
        assert!(!r.fits_page(595.0, 842.0)); // A4 is too small
    }
}
