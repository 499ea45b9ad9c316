//! Caption font resolution and rendering.
//!
//! The font is resolved exactly once per run from
//! [`crate::config::StampConfig::font`]: a TrueType file when a path is
//! configured, the built-in 8×8 bitmap font otherwise. A configured
//! path that fails to load is an error — never a silent fallback — so
//! a typo in `--font` cannot quietly change how every label renders.
//!
//! The built-in font keeps the pipeline free of environment
//! dependencies: it ships as const glyph data (`font8x8`), needs no
//! file on disk, and renders deterministically on every machine, which
//! also makes label-geometry tests exact.

use crate::error::StamperError;
use ab_glyph::{FontVec, PxScale};
use font8x8::legacy::BASIC_LEGACY;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::Path;
use tracing::debug;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// A resolved caption font, ready to measure and draw.
#[derive(Debug)]
pub enum CaptionFont {
    /// A TrueType font loaded from the configured path.
    TrueType { font: FontVec, scale: PxScale },
    /// The built-in 8×8 bitmap font, scaled up by an integer factor.
    Builtin { px: u32 },
}

impl CaptionFont {
    /// Resolve the font once for the whole run.
    ///
    /// `scale` is the caption pixel height; the built-in font rounds it
    /// to the nearest multiple of its 8 px glyph grid.
    pub fn resolve(path: Option<&Path>, scale: f32) -> Result<Self, StamperError> {
        match path {
            Some(p) => {
                let bytes = std::fs::read(p).map_err(|e| StamperError::FontLoadFailed {
                    path: p.to_path_buf(),
                    detail: e.to_string(),
                })?;
                let font =
                    FontVec::try_from_vec(bytes).map_err(|e| StamperError::FontLoadFailed {
                        path: p.to_path_buf(),
                        detail: e.to_string(),
                    })?;
                debug!("Caption font: {} at {scale}px", p.display());
                Ok(Self::TrueType {
                    font,
                    scale: PxScale::from(scale),
                })
            }
            None => {
                let px = ((scale / 8.0).round() as u32).max(1);
                debug!("Caption font: built-in bitmap at {}px", px * 8);
                Ok(Self::Builtin { px })
            }
        }
    }

    /// Rendered bounding box of `text`, in pixels.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            Self::TrueType { font, scale } => text_size(*scale, font, text),
            Self::Builtin { px } => (text.chars().count() as u32 * 8 * px, 8 * px),
        }
    }

    /// Draw `text` in black with its top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbImage, x: u32, y: u32, text: &str) {
        match self {
            Self::TrueType { font, scale } => {
                draw_text_mut(canvas, BLACK, x as i32, y as i32, *scale, font, text);
            }
            Self::Builtin { px } => draw_bitmap_text(canvas, x, y, *px, text),
        }
    }
}

/// Render `text` with the 8×8 glyph set, each glyph pixel expanded to a
/// `px` × `px` block. Characters outside the basic set render as '?'.
fn draw_bitmap_text(canvas: &mut RgbImage, x: u32, y: u32, px: u32, text: &str) {
    let (width, height) = canvas.dimensions();
    for (i, ch) in text.chars().enumerate() {
        let glyph = glyph_for(ch);
        let origin_x = x + i as u32 * 8 * px;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8u32 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..px {
                    for dx in 0..px {
                        let cx = origin_x + col * px + dx;
                        let cy = y + row as u32 * px + dy;
                        if cx < width && cy < height {
                            canvas.put_pixel(cx, cy, BLACK);
                        }
                    }
                }
            }
        }
    }
}

fn glyph_for(ch: char) -> [u8; 8] {
    let idx = ch as usize;
    if idx < BASIC_LEGACY.len() {
        BASIC_LEGACY[idx]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_measure_is_deterministic() {
        let font = CaptionFont::resolve(None, 28.0).unwrap();
        // 28 / 8 rounds to 4: glyphs render on a 32px grid.
        let (w, h) = font.measure("DDH-001 | Milagros | NV-4490");
        assert_eq!(h, 32);
        assert_eq!(w, 28 * 32);
    }

    #[test]
    fn builtin_scale_never_drops_to_zero() {
        let font = CaptionFont::resolve(None, 1.0).unwrap();
        let (w, h) = font.measure("A");
        assert_eq!((w, h), (8, 8));
    }

    #[test]
    fn builtin_draw_marks_pixels_black() {
        let font = CaptionFont::resolve(None, 8.0).unwrap();
        let mut canvas = RgbImage::from_pixel(80, 16, Rgb([255, 255, 255]));
        font.draw(&mut canvas, 0, 0, "A");
        assert!(
            canvas.pixels().any(|p| *p == Rgb([0, 0, 0])),
            "drawing 'A' should paint at least one black pixel"
        );
    }

    #[test]
    fn draw_clips_at_canvas_edge_without_panicking() {
        let font = CaptionFont::resolve(None, 16.0).unwrap();
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        font.draw(&mut canvas, 5, 5, "WIDE TEXT");
    }

    #[test]
    fn missing_font_file_is_an_error_not_a_fallback() {
        let err =
            CaptionFont::resolve(Some(Path::new("/no/such/font.ttf")), 28.0).unwrap_err();
        assert!(matches!(err, StamperError::FontLoadFailed { .. }));
    }

    #[test]
    fn non_ascii_falls_back_to_question_mark() {
        assert_eq!(glyph_for('Ñ'), glyph_for('?'));
        assert_ne!(glyph_for('A'), glyph_for('?'));
    }
}
