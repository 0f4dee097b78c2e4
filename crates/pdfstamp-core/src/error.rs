use thiserror::Error;

/// Fatal export failures. Per-record problems (bad colors, stale page
/// references, undecodable rasters) are recovered locally and never reach
/// this type.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to load source document: {0}")]
    SourceLoad(String),

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF operation failed: {0}")]
    Operation(String),

    #[error("Failed to serialize document: {0}")]
    Serialize(String),
}
