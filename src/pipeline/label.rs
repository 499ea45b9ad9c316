//! Label composition: QR payload + caption → one raster image.
//!
//! Layout (all values in pixels):
//!
//! ```text
//! ┌─────────────────────────────┐  ─┐ y = 10
//! │     CODE | VEIN | LEVEL     │   │ caption, centred
//! ├─────────────────────────────┤  ─┤ y = caption_h + 20
//! │ ▓▓ QR symbol, left-aligned  │   │
//! │ ▓▓ at x = 0                 │   │
//! └─────────────────────────────┘  ─┘
//! width  = max(QR width, caption width)
//! height = QR height + caption height + 40
//! ```
//!
//! When the caption is wider than the QR symbol, the canvas widens to
//! the caption but the QR stays left-aligned, leaving asymmetric
//! whitespace on the right. That matches how the layout sheets have
//! always been stamped and is intentionally not "fixed" here.

use crate::error::StamperError;
use crate::pipeline::font::CaptionFont;
use crate::record::Record;
use image::{Luma, Rgb, RgbImage};
use qrcode::QrCode;
use tracing::debug;

/// Total vertical padding added around the caption block.
const VERTICAL_PADDING: u32 = 40;
/// Caption baseline offset from the top edge.
const CAPTION_Y: u32 = 10;
/// Gap added below the caption before the QR symbol starts.
const QR_GAP: u32 = 20;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Compose the label image for one record.
///
/// Encodes the ten-field JSON payload as a QR symbol (library-default
/// error correction and version) and stacks the caption above it on a
/// white canvas.
pub fn compose_label(
    record: &Record,
    font: &CaptionFont,
    qr_module_px: u32,
) -> Result<RgbImage, StamperError> {
    let payload = record.payload_json();
    let code = QrCode::new(payload.as_bytes()).map_err(|e| StamperError::QrEncodeFailed {
        code: record.code.clone(),
        detail: e.to_string(),
    })?;

    let qr = code
        .render::<Luma<u8>>()
        .module_dimensions(qr_module_px, qr_module_px)
        .build();
    let (qr_w, qr_h) = qr.dimensions();

    let caption = record.caption();
    let (caption_w, caption_h) = font.measure(&caption);

    let width = qr_w.max(caption_w);
    let height = qr_h + caption_h + VERTICAL_PADDING;
    let mut canvas = RgbImage::from_pixel(width, height, WHITE);

    // Caption centred horizontally; QR left-aligned below it.
    let caption_x = (width - caption_w) / 2;
    font.draw(&mut canvas, caption_x, CAPTION_Y, &caption);

    let qr_y = caption_h + QR_GAP;
    for (x, y, pixel) in qr.enumerate_pixels() {
        let Luma([v]) = *pixel;
        canvas.put_pixel(x, qr_y + y, Rgb([v, v, v]));
    }

    debug!(
        "Composed label for '{}': {}x{} (qr {}x{}, caption {}x{})",
        record.code, width, height, qr_w, qr_h, caption_w, caption_h
    );
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_record;

    fn builtin_font() -> CaptionFont {
        CaptionFont::resolve(None, 28.0).unwrap()
    }

    fn qr_dimensions(record: &Record, module_px: u32) -> (u32, u32) {
        let code = QrCode::new(record.payload_json().as_bytes()).unwrap();
        code.render::<Luma<u8>>()
            .module_dimensions(module_px, module_px)
            .build()
            .dimensions()
    }

    #[test]
    fn geometry_matches_the_contract() {
        let record = sample_record("DDH-001");
        let font = builtin_font();
        let (qr_w, qr_h) = qr_dimensions(&record, 8);
        let (caption_w, caption_h) = font.measure(&record.caption());

        let label = compose_label(&record, &font, 8).unwrap();
        assert_eq!(label.width(), qr_w.max(caption_w));
        assert_eq!(label.height(), qr_h + caption_h + 40);
    }

    #[test]
    fn qr_is_left_aligned_below_the_caption() {
        let record = sample_record("DDH-001");
        let font = builtin_font();
        let (_, caption_h) = font.measure(&record.caption());

        let label = compose_label(&record, &font, 8).unwrap();
        let qr_y = caption_h + 20;
        // Quiet zone: the QR's top-left corner region is white, and the
        // column at x=0 belongs to the symbol (not canvas padding).
        assert_eq!(*label.get_pixel(0, qr_y), Rgb([255, 255, 255]));
        // Somewhere in the symbol's row band there must be black modules.
        let band_has_black = (0..label.width())
            .any(|x| *label.get_pixel(x, qr_y + label.height() / 4) == Rgb([0, 0, 0]));
        assert!(band_has_black, "QR band should contain black modules");
    }

    #[test]
    fn background_is_white() {
        let record = sample_record("DDH-001");
        let label = compose_label(&record, &builtin_font(), 8).unwrap();
        assert_eq!(*label.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(
            *label.get_pixel(label.width() - 1, 0),
            Rgb([255, 255, 255])
        );
    }

    #[test]
    fn payload_round_trips_through_the_symbol() {
        let record = sample_record("DDH-001");
        let label = compose_label(&record, &builtin_font(), 8).unwrap();

        let gray = image::DynamicImage::ImageRgb8(label).to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare(gray);
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "label should contain exactly one QR symbol");
        let (_meta, content) = grids[0].decode().unwrap();

        let decoded: serde_json::Value = serde_json::from_str(&content).unwrap();
        let expected: serde_json::Value =
            serde_json::from_str(&record.payload_json()).unwrap();
        assert_eq!(decoded, expected);
        assert_eq!(decoded.as_object().unwrap().len(), 10);
    }

    #[test]
    fn wide_caption_widens_the_canvas() {
        let mut record = sample_record("DDH-001");
        record.vein = "A very long vein name that outgrows the symbol".into();
        record.level = "NV-4490-SUB-LEVEL-EXTENSION".into();
        let font = builtin_font();
        let (caption_w, _) = font.measure(&record.caption());
        let (qr_w, _) = qr_dimensions(&record, 4);

        let label = compose_label(&record, &font, 4).unwrap();
        assert!(caption_w > qr_w, "test premise: caption wider than QR");
        assert_eq!(label.width(), caption_w);
    }
}
