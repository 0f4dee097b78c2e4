//! Build a small blank document, burn a few annotations into it, and write
//! the result next to the working directory.
//!
//! Run with: cargo run --example stamp_notes

use anyhow::Result;
use lopdf::{dictionary, Document, Object};
use pdfstamp_core::{export_annotated, AnnotationRecord, ExportConfig};
use std::sync::Arc;

fn blank_document(pages: usize) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.7");
    let page_ids: Vec<_> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            })
        })
        .collect();
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "Count" => pages as i64,
    });
    for id in &page_ids {
        if let Ok(dict) = doc.get_object_mut(*id)?.as_dict_mut() {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    // The shape the UI layer ships records in.
    let records: Vec<AnnotationRecord> = serde_json::from_str(
        r##"[
        {
            "id": "highlight-1",
            "kind": "text",
            "position": {
                "boundingRect": {
                    "x1": 72.0, "y1": 96.0, "x2": 340.0, "y2": 130.0,
                    "pageWidth": 612.0, "pageHeight": 792.0, "pageNumber": 1
                },
                "rects": [
                    {
                        "x1": 72.0, "y1": 96.0, "x2": 340.0, "y2": 112.0,
                        "pageWidth": 612.0, "pageHeight": 792.0, "pageNumber": 1
                    },
                    {
                        "x1": 72.0, "y1": 114.0, "x2": 260.0, "y2": 130.0,
                        "pageWidth": 612.0, "pageHeight": 792.0, "pageNumber": 1
                    }
                ]
            }
        },
        {
            "id": "note-1",
            "kind": "freetext",
            "content": {"text": "Reviewed.\nPlease re-check the totals in section 4."},
            "position": {
                "boundingRect": {
                    "x1": 360.0, "y1": 200.0, "x2": 560.0, "y2": 300.0,
                    "pageWidth": 612.0, "pageHeight": 792.0, "pageNumber": 2
                },
                "rects": []
            },
            "color": "#1a1a1a",
            "backgroundColor": "#fff9c4",
            "fontSize": 12.0
        }
    ]"##,
    )?;

    let config = ExportConfig::new().with_progress(Arc::new(|done, total| {
        tracing::info!("Rendered page group {}/{}", done, total);
    }));

    let source = blank_document(2)?;
    let bytes = export_annotated(source, &records, &config)?;
    std::fs::write("annotated.pdf", &bytes)?;
    tracing::info!("Wrote annotated.pdf ({} bytes)", bytes.len());
    Ok(())
}
