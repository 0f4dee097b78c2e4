//! Annotation records and normalized geometry
//!
//! Geometry is stored in page-relative units together with the reference
//! page dimensions it was captured against, so a rectangle survives any
//! later zoom or viewport resize. Records are produced by the UI layer and
//! consumed read-only by the export engine.

use serde::{Deserialize, Serialize};

/// A rectangle in normalized page-relative coordinates, origin top-left.
///
/// `page_width` / `page_height` record the reference frame the rectangle was
/// captured in. Invariants (upheld by the producing UI layer): `x1 <= x2`,
/// `y1 <= y2`, `page_width > 0`, `page_height > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub page_width: f64,
    pub page_height: f64,
    /// 1-indexed target page number.
    pub page_number: u32,
}

impl NormalizedRect {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// Placement of one annotation: an authoritative bounding box plus optional
/// ordered sub-regions (per-line selection boxes for text highlights).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPosition {
    pub bounding_rect: NormalizedRect,
    #[serde(default)]
    pub rects: Vec<NormalizedRect>,
}

/// The closed set of annotation kinds the engine renders.
///
/// `Unknown` absorbs missing or unrecognized wire values; it renders through
/// the area handler, keeping the backward-compatible default an explicit,
/// typed decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Text,
    Area,
    FreeText,
    Image,
    Drawing,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Kind-dependent payload: text for freetext boxes, a base64 raster
/// (optionally a `data:` URL) for image and drawing stamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Per-record style overrides. Every field is optional; absent fields fall
/// back to the `ExportConfig` defaults, then to built-in values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationStyle {
    /// Fill/stroke color string (`#rgb`, `#rrggbb`, `rgb()`, `rgba()`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Background color string (freetext boxes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Freetext type size, in the capture frame's units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Accepted for wire compatibility; rendering always uses the document's
    /// single embedded font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl AnnotationStyle {
    /// First layer of the `record ?? config ?? builtin` resolution chain.
    pub fn color_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.color.as_deref().unwrap_or(default)
    }

    pub fn background_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.background_color.as_deref().unwrap_or(default)
    }

    pub fn font_size_or(&self, default: f64) -> f64 {
        self.font_size.unwrap_or(default)
    }
}

/// One annotation as produced by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub id: String,
    #[serde(default)]
    pub kind: AnnotationKind,
    pub position: NormalizedPosition,
    #[serde(default)]
    pub content: AnnotationContent,
    #[serde(flatten)]
    pub style: AnnotationStyle,
}

impl AnnotationRecord {
    /// 1-indexed page this record targets.
    pub fn page_number(&self) -> u32 {
        self.position.bounding_rect.page_number
    }
}
