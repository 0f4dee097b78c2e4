//! Test-only PDF builder.

use lopdf::{dictionary, Document, Object};

/// Serialize a minimal document with `pages` US-Letter pages.
pub(crate) fn with_pages(pages: usize) -> Vec<u8> {
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
        if let Ok(dict) = doc.get_object_mut(*id).unwrap().as_dict_mut() {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
