//! Export orchestration
//!
//! Loads the source document, groups annotation records by target page, and
//! drives sequential per-page rendering before serializing the mutated
//! document back to bytes. Pages are processed one at a time and records
//! within a page in input order; the page mutation capability is not
//! assumed safe for concurrent access and visual stacking order depends on
//! sequential application.

use std::path::PathBuf;

use lopdf::{dictionary, Document, Object, ObjectId};
use pdfstamp_types::{AnnotationRecord, ExportConfig};

use crate::error::ExportError;
use crate::render::render_record;
use crate::surface::{PageSurface, ResourceNames};

/// Where the source document comes from. Fetch-and-materialize is the
/// engine's only I/O boundary; every variant ends as in-memory bytes.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
    Url(String),
}

impl From<Vec<u8>> for DocumentSource {
    fn from(bytes: Vec<u8>) -> Self {
        DocumentSource::Bytes(bytes)
    }
}

impl From<&[u8]> for DocumentSource {
    fn from(bytes: &[u8]) -> Self {
        DocumentSource::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        DocumentSource::Path(path)
    }
}

impl DocumentSource {
    fn materialize(self) -> Result<Vec<u8>, ExportError> {
        match self {
            DocumentSource::Bytes(bytes) => Ok(bytes),
            DocumentSource::Path(path) => std::fs::read(&path)
                .map_err(|e| ExportError::SourceLoad(format!("{}: {}", path.display(), e))),
            DocumentSource::Url(url) => {
                let response = reqwest::blocking::get(&url)
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| ExportError::SourceLoad(e.to_string()))?;
                let bytes = response
                    .bytes()
                    .map_err(|e| ExportError::SourceLoad(e.to_string()))?;
                Ok(bytes.to_vec())
            }
        }
    }
}

/// Burn `records` into the source document and return its serialized bytes.
///
/// Per-record problems (bad styles, stale page references, undecodable
/// rasters) degrade the output instead of failing it; only a source that
/// cannot be loaded or a document that cannot be re-serialized rejects the
/// export. The progress callback fires once per page group with 1-indexed,
/// monotonically increasing `(completed, total)`.
pub fn export_annotated(
    source: impl Into<DocumentSource>,
    records: &[AnnotationRecord],
    config: &ExportConfig,
) -> Result<Vec<u8>, ExportError> {
    let bytes = source.into().materialize()?;
    let mut doc =
        Document::load_mem(&bytes).map_err(|e| ExportError::Parse(e.to_string()))?;

    let pages = doc.get_pages();
    let font_id = doc.add_object(Object::Dictionary(helvetica_font()));
    let groups = group_by_page(records);
    let total = groups.len();
    let mut names = ResourceNames::default();

    for (completed, (page_number, members)) in groups.into_iter().enumerate() {
        match pages.get(&page_number) {
            Some(&page_id) => {
                let mut surface = PageSurface::new(&mut doc, page_id, font_id, &mut names);
                for index in members {
                    render_record(&mut surface, &records[index], config);
                }
                surface.finish()?;
            }
            None => {
                // Stale page references never abort an export.
                tracing::warn!(
                    "Source document has no page {} ({} pages), skipping records",
                    page_number,
                    pages.len()
                );
            }
        }
        if let Some(on_progress) = &config.on_progress {
            on_progress(completed + 1, total);
        }
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| ExportError::Serialize(e.to_string()))?;
    Ok(output)
}

/// The per-document font resource every text run uses.
fn helvetica_font() -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Group record indices by target page, preserving per-page input order.
///
/// Groups are kept in first-encountered order, not ascending page order:
/// the stacking/progress timeline follows the original record sequence, and
/// a sorted map would silently change it.
fn group_by_page(records: &[AnnotationRecord]) -> Vec<(u32, Vec<usize>)> {
    let mut groups: Vec<(u32, Vec<usize>)> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let page = record.page_number();
        match groups.iter_mut().find(|(number, _)| *number == page) {
            Some((_, members)) => members.push(index),
            None => groups.push((page, vec![index])),
        }
    }
    groups
}
