//! Annotation coordinate & export engine
//!
//! Burns a set of annotation records into an existing PDF. Records carry
//! their geometry in viewport-independent normalized coordinates; the
//! engine converts each into the target page's native space and emits
//! drawing primitives into the page's content stream.
//!
//! The export is best-effort by design: a malformed style, a stale page
//! reference, or an undecodable raster degrades the output (with a
//! diagnostic on the `tracing` facade) instead of aborting it. Only a
//! source document that cannot be loaded, or a mutated document that cannot
//! be re-serialized, fails the export.
//!
//! ```no_run
//! use pdfstamp_core::{export_annotated, AnnotationRecord, DocumentSource, ExportConfig};
//!
//! let records: Vec<AnnotationRecord> = serde_json::from_str(r#"[]"#).unwrap();
//! let bytes = export_annotated(
//!     DocumentSource::Path("form.pdf".into()),
//!     &records,
//!     &ExportConfig::default(),
//! ).unwrap();
//! std::fs::write("form-annotated.pdf", bytes).unwrap();
//! ```

pub mod color;
pub mod coords;
pub mod error;
pub mod export;
pub mod metrics;
pub mod raster;
pub mod surface;
pub mod wrap;

mod render;
#[cfg(test)]
mod test_pdf;

pub use color::{parse_color, Rgba, FALLBACK_COLOR};
pub use coords::{to_page_space, PageRect};
pub use error::ExportError;
pub use export::{export_annotated, DocumentSource};
pub use wrap::wrap;

// Re-export the shared data model so callers only need one crate.
pub use pdfstamp_types::{
    AnnotationContent, AnnotationKind, AnnotationRecord, AnnotationStyle, ExportConfig,
    NormalizedPosition, NormalizedRect, ProgressCallback,
};
