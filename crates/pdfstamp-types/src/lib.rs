//! Shared annotation data model
//!
//! This crate defines the wire types exchanged between the annotation UI
//! layer and the export engine: normalized geometry, annotation records, and
//! export configuration. The engine treats every record as an immutable,
//! already-validated value.

pub mod config;
pub mod records;

pub use config::{ExportConfig, ProgressCallback};
pub use records::{
    AnnotationContent, AnnotationKind, AnnotationRecord, AnnotationStyle, NormalizedPosition,
    NormalizedRect,
};
