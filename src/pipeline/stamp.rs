//! Document stamping: embed a label PNG into page one of a layout PDF.
//!
//! The overlay rectangle is a constant in the page's own coordinate
//! space — the layout sheets are produced from one template, so the QR
//! region is always in the same place. Placement is literal: a page
//! with unexpected dimensions gets a misplaced or clipped label rather
//! than a rescaled one. `enforce_page_bounds` turns that situation into
//! an error for callers who prefer rejection over a clipped stamp.

use crate::config::OverlayRect;
use crate::error::StamperError;
use lopdf::{Document, Object, ObjectId};
use std::path::Path;
use tracing::debug;

/// Stamp `label_png` onto the first page of `pdf_bytes` and save the
/// result to `out_path`.
///
/// `name` is the supplied document's filename, used in diagnostics.
pub fn stamp_document(
    name: &str,
    pdf_bytes: &[u8],
    label_png: &Path,
    rect: &OverlayRect,
    enforce_page_bounds: bool,
    out_path: &Path,
) -> Result<(), StamperError> {
    let mut doc = Document::load_mem(pdf_bytes).map_err(|e| StamperError::PdfOpen {
        name: name.to_string(),
        detail: e.to_string(),
    })?;

    let pages = doc.get_pages();
    let (_, &page_id) = pages
        .iter()
        .next()
        .ok_or_else(|| StamperError::PdfNoPages {
            name: name.to_string(),
        })?;

    if enforce_page_bounds {
        if let Some((page_w, page_h)) = page_size(&doc, page_id) {
            if !rect.fits_page(page_w, page_h) {
                return Err(StamperError::OverlayOutOfBounds {
                    name: name.to_string(),
                    x0: rect.x0,
                    y0: rect.y0,
                    x1: rect.x1,
                    y1: rect.y1,
                    page_w,
                    page_h,
                });
            }
        }
    }

    let img = lopdf::xobject::image(label_png).map_err(|e| StamperError::StampFailed {
        name: name.to_string(),
        detail: format!("image XObject: {e}"),
    })?;

    doc.insert_image(
        page_id,
        img,
        (rect.x0, rect.y0),
        (rect.width(), rect.height()),
    )
    .map_err(|e| StamperError::StampFailed {
        name: name.to_string(),
        detail: e.to_string(),
    })?;

    doc.save(out_path).map_err(|e| StamperError::StampFailed {
        name: name.to_string(),
        detail: format!("save: {e}"),
    })?;

    debug!(
        "Stamped '{}' at ({}, {}) {}x{} → {}",
        name,
        rect.x0,
        rect.y0,
        rect.width(),
        rect.height(),
        out_path.display()
    );
    Ok(())
}

/// First-page dimensions from the MediaBox, following the Parent chain
/// when the page inherits it. `None` when no MediaBox is declared.
fn page_size(doc: &Document, page_id: ObjectId) -> Option<(f32, f32)> {
    let mut current = page_id;
    for _ in 0..8 {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let coords = media_box
                .as_array()
                .ok()?
                .iter()
                .filter_map(as_number)
                .collect::<Vec<f32>>();
            if coords.len() == 4 {
                return Some((coords[2], coords[3]));
            }
            return None;
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => return None,
        }
    }
    None
}

fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::dictionary;
    use lopdf::Stream;

    /// A minimal one-page PDF with the given MediaBox, as bytes.
    pub(crate) fn blank_pdf(width: i64, height: i64) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content = Content {
            operations: Vec::<Operation>::new(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn tiny_label(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("label.png");
        image::RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn stamps_at_literal_coordinates_regardless_of_page_size() {
        let dir = tempfile::tempdir().unwrap();
        let label = tiny_label(dir.path());
        let out = dir.path().join("out.pdf");
        let rect = OverlayRect::default();

        // A4 page: far smaller than the rectangle assumes. Placement
        // must still use the literal coordinates, not scale to fit.
        let pdf = blank_pdf(595, 842);
        stamp_document("A Layout.pdf", &pdf, &label, &rect, false, &out).unwrap();

        let doc = Document::load(&out).unwrap();
        let (_, &page_id) = doc.get_pages().iter().next().unwrap();
        let content = doc.get_and_decode_page_content(page_id).unwrap();

        let cm = content
            .operations
            .iter()
            .find(|op| op.operator == "cm")
            .expect("stamped page should have a cm placement matrix");
        let nums: Vec<f32> = cm
            .operands
            .iter()
            .filter_map(as_number)
            .collect();
        assert_eq!(nums.len(), 6);
        assert_eq!(nums[0], 150.0); // width
        assert_eq!(nums[3], 160.0); // height
        assert_eq!(nums[4], 600.0); // x
        assert_eq!(nums[5], 870.0); // y
    }

    #[test]
    fn bounds_enforcement_rejects_small_pages() {
        let dir = tempfile::tempdir().unwrap();
        let label = tiny_label(dir.path());
        let out = dir.path().join("out.pdf");
        let rect = OverlayRect::default();

        let pdf = blank_pdf(595, 842);
        let err =
            stamp_document("A Layout.pdf", &pdf, &label, &rect, true, &out).unwrap_err();
        assert!(matches!(err, StamperError::OverlayOutOfBounds { .. }));
    }

    #[test]
    fn bounds_enforcement_accepts_the_template_page() {
        let dir = tempfile::tempdir().unwrap();
        let label = tiny_label(dir.path());
        let out = dir.path().join("out.pdf");
        let rect = OverlayRect::default();

        let pdf = blank_pdf(842, 1191);
        stamp_document("A Layout.pdf", &pdf, &label, &rect, true, &out).unwrap();
        assert!(out.exists());
    }

    #[test]
    fn garbage_bytes_are_a_pdf_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let label = tiny_label(dir.path());
        let out = dir.path().join("out.pdf");

        let err = stamp_document(
            "A Layout.pdf",
            b"not a pdf",
            &label,
            &OverlayRect::default(),
            false,
            &out,
        )
        .unwrap_err();
        assert!(matches!(err, StamperError::PdfOpen { .. }));
    }

    #[test]
    fn media_box_is_found_through_the_parent_chain() {
        // blank_pdf puts MediaBox on the page itself; move it to Pages.
        let bytes = blank_pdf(842, 1191);
        let mut doc = Document::load_mem(&bytes).unwrap();
        let (_, &page_id) = doc.get_pages().iter().next().unwrap();

        let media_box = {
            let page = doc.get_object_mut(page_id).unwrap().as_dict_mut().unwrap();
            let mb = page.get(b"MediaBox").unwrap().clone();
            page.remove(b"MediaBox");
            mb
        };
        let parent_id = {
            let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
            page.get(b"Parent").unwrap().as_reference().unwrap()
        };
        doc.get_object_mut(parent_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("MediaBox", media_box);

        assert_eq!(page_size(&doc, page_id), Some((842.0, 1191.0)));
    }
}
