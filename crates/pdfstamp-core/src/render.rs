//! Per-kind annotation renderers
//!
//! Stateless functions: each takes one record plus the shared defaults,
//! resolves colors and geometry, and issues drawing commands against the
//! page surface. Unrecognized kinds keep rendering as plain areas so old
//! records never break an export.

use pdfstamp_types::{AnnotationKind, AnnotationRecord, ExportConfig, NormalizedRect};

use crate::color::parse_color;
use crate::coords::{to_page_space, y_ratio};
use crate::metrics::text_width;
use crate::raster;
use crate::surface::PageSurface;
use crate::wrap::wrap;

/// Freetext box inset, in capture-frame units (scaled with the box).
const FREETEXT_PADDING: f64 = 4.0;

/// Line advance as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

pub(crate) fn render_record(
    surface: &mut PageSurface<'_>,
    record: &AnnotationRecord,
    config: &ExportConfig,
) {
    match record.kind {
        AnnotationKind::Text => render_text(surface, record, config),
        AnnotationKind::Area => render_area(surface, record, config),
        AnnotationKind::FreeText => render_freetext(surface, record, config),
        AnnotationKind::Image | AnnotationKind::Drawing => render_raster(surface, record),
        AnnotationKind::Unknown => render_area(surface, record, config),
    }
}

/// Text highlights span one box per selected line; a record without
/// sub-rects falls back to its bounding box.
fn render_text(surface: &mut PageSurface<'_>, record: &AnnotationRecord, config: &ExportConfig) {
    let color = parse_color(record.style.color_or(&config.text_color));
    let rects: &[NormalizedRect] = if record.position.rects.is_empty() {
        std::slice::from_ref(&record.position.bounding_rect)
    } else {
        &record.position.rects
    };
    for rect in rects {
        let mapped = to_page_space(rect, surface.width(), surface.height());
        surface.fill_rect(&mapped, color);
    }
}

fn render_area(surface: &mut PageSurface<'_>, record: &AnnotationRecord, config: &ExportConfig) {
    let color = parse_color(record.style.color_or(&config.area_color));
    let mapped = to_page_space(
        &record.position.bounding_rect,
        surface.width(),
        surface.height(),
    );
    surface.fill_rect(&mapped, color);
}

/// Background box plus wrapped text, drawn top-down. The type size and
/// padding scale with the same vertical ratio as the box itself, so the
/// author-intended size survives any capture frame. Lines that would cross
/// the padded bottom edge are silently clipped.
fn render_freetext(
    surface: &mut PageSurface<'_>,
    record: &AnnotationRecord,
    config: &ExportConfig,
) {
    let bounds = &record.position.bounding_rect;
    let mapped = to_page_space(bounds, surface.width(), surface.height());
    let ratio = y_ratio(bounds, surface.height());

    let font_size = record.style.font_size_or(config.freetext_font_size) * ratio;
    let padding = FREETEXT_PADDING * ratio;
    let line_height = font_size * LINE_HEIGHT_FACTOR;

    let background = parse_color(record.style.background_or(&config.freetext_background));
    let color = parse_color(record.style.color_or(&config.freetext_color));

    surface.fill_rect(&mapped, background);

    let text = record.content.text.as_deref().unwrap_or_default();
    if text.is_empty() {
        return;
    }

    let max_width = mapped.width - 2.0 * padding;
    let mut baseline = mapped.y + mapped.height - line_height - padding;
    for line in wrap(text, |s| text_width(s, font_size), max_width) {
        if baseline < mapped.y + padding {
            break;
        }
        if !line.is_empty() {
            surface.draw_text_line(&line, mapped.x + padding, baseline, font_size, color);
        }
        baseline -= line_height;
    }
}

/// Image and drawing stamps share one path: decode the embedded raster and
/// place it at the transformed box. A record whose payload cannot be
/// decoded is dropped with a diagnostic; the export continues.
fn render_raster(surface: &mut PageSurface<'_>, record: &AnnotationRecord) {
    let Some(payload) = record.content.image.as_deref() else {
        tracing::warn!("Annotation {} has no image payload, skipping", record.id);
        return;
    };
    match raster::decode_payload(payload) {
        Ok(image) => {
            let mapped = to_page_space(
                &record.position.bounding_rect,
                surface.width(),
                surface.height(),
            );
            surface.draw_image(&image, &mapped);
        }
        Err(err) => {
            tracing::warn!("Failed to decode raster for annotation {}: {}", record.id, err);
        }
    }
}
