//! Coordinate transformation between normalized and PDF page space
//!
//! Normalized space has a top-left origin and is tagged with the page
//! dimensions it was captured against; PDF user space has a bottom-left
//! origin and absolute point units. This module is the single geometry
//! authority for every renderer.

use pdfstamp_types::NormalizedRect;

/// A rectangle in the target page's native space: `(x, y)` is the
/// bottom-left corner, units are PDF points. Fractional coordinates are
/// kept as-is; drawing accepts them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Map a normalized rectangle onto a page of the given dimensions.
///
/// The axes scale independently: source and target aspect ratios may
/// legitimately differ slightly from floating-point capture, so width and
/// height each follow their own ratio. The vertical axis is flipped.
pub fn to_page_space(rect: &NormalizedRect, page_width: f64, page_height: f64) -> PageRect {
    let x_ratio = page_width / rect.page_width;
    let y_ratio = page_height / rect.page_height;
    let width = rect.width() * x_ratio;
    let height = rect.height() * y_ratio;
    PageRect {
        x: rect.x1 * x_ratio,
        y: page_height - rect.y1 * y_ratio - height,
        width,
        height,
    }
}

/// The vertical scale factor between a rectangle's capture frame and the
/// target page. Freetext type size and padding follow this ratio so the
/// rendered type stays proportional to its box.
pub fn y_ratio(rect: &NormalizedRect, page_height: f64) -> f64 {
    page_height / rect.page_height
}
