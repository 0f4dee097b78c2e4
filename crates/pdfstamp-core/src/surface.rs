//! Page surface capability
//!
//! One `PageSurface` wraps a single page of the loaded document and exposes
//! the three drawing primitives the renderers need: filled rectangles, text
//! runs, and embedded rasters. Commands are buffered as content-stream
//! operators; `finish` appends them to the page inside a `q .. Q` guard and
//! merges the required Font / XObject / ExtGState entries into the page's
//! resources.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::color::Rgba;
use crate::coords::PageRect;
use crate::error::ExportError;
use crate::raster::DecodedImage;

/// Bounds for walking Parent chains; real page trees are a few levels deep.
const MAX_TREE_DEPTH: usize = 16;

/// US Letter, used when a page carries no resolvable MediaBox.
const FALLBACK_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

/// Allocates resource names that stay unique across one whole export, so
/// merged entries can never collide between pages sharing a resources
/// dictionary.
#[derive(Debug, Default)]
pub struct ResourceNames {
    next: usize,
}

impl ResourceNames {
    fn allocate(&mut self, prefix: &str) -> String {
        let name = format!("{}{}", prefix, self.next);
        self.next += 1;
        name
    }
}

pub struct PageSurface<'a> {
    doc: &'a mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    names: &'a mut ResourceNames,
    width: f64,
    height: f64,
    ops: String,
    font_name: Option<String>,
    images: Vec<(String, ObjectId)>,
    gstates: Vec<(String, f64)>,
}

impl<'a> PageSurface<'a> {
    pub fn new(
        doc: &'a mut Document,
        page_id: ObjectId,
        font_id: ObjectId,
        names: &'a mut ResourceNames,
    ) -> Self {
        let (width, height) = media_box_size(doc, page_id).unwrap_or(FALLBACK_PAGE_SIZE);
        Self {
            doc,
            page_id,
            font_id,
            names,
            width,
            height,
            ops: String::new(),
            font_name: None,
            images: Vec::new(),
            gstates: Vec::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn fill_rect(&mut self, rect: &PageRect, color: Rgba) {
        self.ops.push_str("q\n");
        self.push_fill_state(color);
        self.ops.push_str(&format!(
            "{} {} {} {} re f\nQ\n",
            fmt(rect.x),
            fmt(rect.y),
            fmt(rect.width),
            fmt(rect.height)
        ));
    }

    /// Draw one already-wrapped line with its baseline at `(x, y)`.
    pub fn draw_text_line(&mut self, text: &str, x: f64, y: f64, font_size: f64, color: Rgba) {
        let font = match &self.font_name {
            Some(name) => name.clone(),
            None => {
                let name = self.names.allocate("Fs");
                self.font_name = Some(name.clone());
                name
            }
        };
        self.ops.push_str("q\n");
        self.push_fill_state(color);
        self.ops.push_str(&format!(
            "BT\n/{} {} Tf\n{} {} Td\n({}) Tj\nET\nQ\n",
            font,
            fmt(font_size),
            fmt(x),
            fmt(y),
            escape_pdf_string(text)
        ));
    }

    /// Embed a decoded raster and draw it into `rect`.
    pub fn draw_image(&mut self, image: &DecodedImage, rect: &PageRect) {
        let xobject_id = image.add_to_document(self.doc);
        let name = self.names.allocate("Im");
        self.ops.push_str(&format!(
            "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
            fmt(rect.width),
            fmt(rect.height),
            fmt(rect.x),
            fmt(rect.y),
            name
        ));
        self.images.push((name, xobject_id));
    }

    fn push_fill_state(&mut self, color: Rgba) {
        if color.a < 1.0 {
            let name = self.names.allocate("Gs");
            self.ops.push_str(&format!("/{} gs\n", name));
            self.gstates.push((name, color.a));
        }
        self.ops.push_str(&format!(
            "{} {} {} rg\n",
            fmt(color.r),
            fmt(color.g),
            fmt(color.b)
        ));
    }

    /// Flush the buffered commands into the page. A surface that drew
    /// nothing leaves the page untouched.
    pub fn finish(self) -> Result<(), ExportError> {
        if self.ops.is_empty() {
            return Ok(());
        }

        let content = format!("q\n{}Q", self.ops);
        let stream_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.into_bytes()));
        append_content_stream(self.doc, self.page_id, stream_id)?;

        let mut additions: Vec<(&str, String, Object)> = Vec::new();
        if let Some(font) = self.font_name {
            additions.push(("Font", font, Object::Reference(self.font_id)));
        }
        for (name, id) in self.images {
            additions.push(("XObject", name, Object::Reference(id)));
        }
        for (name, alpha) in self.gstates {
            let gs = dictionary! {
                "Type" => "ExtGState",
                "ca" => alpha as f32,
                "CA" => alpha as f32,
            };
            additions.push(("ExtGState", name, Object::Dictionary(gs)));
        }
        merge_resources(self.doc, self.page_id, additions)
    }
}

/// Format a coordinate for a content stream: fixed precision, trailing
/// zeros stripped (f64's scientific notation is not valid PDF syntax).
fn fmt(value: f64) -> String {
    let s = format!("{:.4}", value);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escape special characters for PDF string literals. Non-ASCII input has
/// no glyph in the embedded WinAnsi font and degrades to `?`.
fn escape_pdf_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            '\\' => "\\\\".to_string(),
            _ if c.is_ascii() && !c.is_ascii_control() => c.to_string(),
            _ => "?".to_string(),
        })
        .collect()
}

fn op_error(err: lopdf::Error) -> ExportError {
    ExportError::Operation(err.to_string())
}

fn object_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(v) => Some(*v as f64),
        Object::Real(v) => Some(f64::from(*v)),
        _ => None,
    }
}

/// Resolve the page's MediaBox, following Parent inheritance.
fn media_box_size(doc: &Document, page_id: ObjectId) -> Option<(f64, f64)> {
    let mut node = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_object(node).ok()?.as_dict().ok()?;
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let resolved = match media_box {
                Object::Reference(id) => doc.get_object(*id).ok()?,
                other => other,
            };
            let values: Vec<f64> = resolved
                .as_array()
                .ok()?
                .iter()
                .filter_map(object_number)
                .collect();
            if values.len() == 4 {
                return Some((values[2] - values[0], values[3] - values[1]));
            }
            return None;
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(id)) => node = *id,
            _ => break,
        }
    }
    None
}

/// Append a content stream to the page's `Contents`, which may be missing,
/// a direct or referenced array, or a reference to a single stream.
fn append_content_stream(
    doc: &mut Document,
    page_id: ObjectId,
    stream_id: ObjectId,
) -> Result<(), ExportError> {
    let current = doc
        .get_object(page_id)
        .map_err(op_error)?
        .as_dict()
        .map_err(op_error)?
        .get(b"Contents")
        .ok()
        .cloned();

    let contents = match current {
        None => Object::Array(vec![Object::Reference(stream_id)]),
        Some(Object::Array(mut refs)) => {
            refs.push(Object::Reference(stream_id));
            Object::Array(refs)
        }
        Some(Object::Reference(id)) => match doc.get_object(id).map_err(op_error)? {
            Object::Array(refs) => {
                let mut refs = refs.clone();
                refs.push(Object::Reference(stream_id));
                Object::Array(refs)
            }
            _ => Object::Array(vec![Object::Reference(id), Object::Reference(stream_id)]),
        },
        // A direct stream in the page dictionary is promoted to an array of
        // references so the new stream can follow it.
        Some(direct) => {
            let existing_id = doc.add_object(direct);
            Object::Array(vec![
                Object::Reference(existing_id),
                Object::Reference(stream_id),
            ])
        }
    };

    let page = doc
        .get_object_mut(page_id)
        .map_err(op_error)?
        .as_dict_mut()
        .map_err(op_error)?;
    page.set("Contents", contents);
    Ok(())
}

/// Merge `(category, name, value)` entries into the page's resources,
/// handling direct, referenced, and parent-inherited dictionaries.
fn merge_resources(
    doc: &mut Document,
    page_id: ObjectId,
    additions: Vec<(&str, String, Object)>,
) -> Result<(), ExportError> {
    if additions.is_empty() {
        return Ok(());
    }

    let existing = doc
        .get_object(page_id)
        .map_err(op_error)?
        .as_dict()
        .map_err(op_error)?
        .get(b"Resources")
        .ok()
        .cloned();

    // Snapshot the effective resources dictionary, remembering where to
    // write it back.
    let (target, mut resources) = match existing {
        Some(Object::Reference(id)) => {
            let dict = doc
                .get_object(id)
                .map_err(op_error)?
                .as_dict()
                .map_err(op_error)?
                .clone();
            (Some(id), dict)
        }
        Some(Object::Dictionary(dict)) => (None, dict),
        _ => (None, inherited_resources(doc, page_id)),
    };

    for (category, name, value) in additions {
        // Category sub-dictionaries may themselves be references; they are
        // inlined before gaining entries so shared dictionaries on other
        // pages stay untouched.
        let mut sub = match resources.get(category.as_bytes()) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(id)) => doc
                .get_object(*id)
                .ok()
                .and_then(|obj| obj.as_dict().ok())
                .cloned()
                .unwrap_or_default(),
            _ => Dictionary::new(),
        };
        sub.set(name, value);
        resources.set(category, Object::Dictionary(sub));
    }

    match target {
        Some(id) => {
            let slot = doc.get_object_mut(id).map_err(op_error)?;
            *slot = Object::Dictionary(resources);
        }
        None => {
            let page = doc
                .get_object_mut(page_id)
                .map_err(op_error)?
                .as_dict_mut()
                .map_err(op_error)?;
            page.set("Resources", Object::Dictionary(resources));
        }
    }
    Ok(())
}

/// Clone the nearest inherited resources dictionary, or start a fresh one.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut node = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let Ok(dict) = doc.get_object(node).and_then(|obj| obj.as_dict()) else {
            break;
        };
        if node != page_id {
            match dict.get(b"Resources") {
                Ok(Object::Dictionary(found)) => return found.clone(),
                Ok(Object::Reference(id)) => {
                    if let Ok(found) = doc.get_object(*id).and_then(|obj| obj.as_dict()) {
                        return found.clone();
                    }
                }
                _ => {}
            }
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(id)) => node = *id,
            _ => break,
        }
    }
    Dictionary::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_page_doc() -> (Document, ObjectId, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        (doc, page_id, font_id)
    }

    fn page_ops(doc: &Document, page_id: ObjectId) -> String {
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        let mut out = String::new();
        for entry in contents {
            let id = entry.as_reference().unwrap();
            let stream = doc.get_object(id).unwrap().as_stream().unwrap();
            out.push_str(&String::from_utf8_lossy(&stream.content));
        }
        out
    }

    #[test]
    fn test_fmt_trims_trailing_zeros() {
        assert_eq!(fmt(300.0), "300");
        assert_eq!(fmt(0.5), "0.5");
        assert_eq!(fmt(12.3456789), "12.3457");
        assert_eq!(fmt(0.0), "0");
        assert_eq!(fmt(-0.00001), "0");
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("Hello"), "Hello");
        assert_eq!(escape_pdf_string("(test)"), "\\(test\\)");
        assert_eq!(escape_pdf_string("back\\slash"), "back\\\\slash");
        assert_eq!(escape_pdf_string("naïve"), "na?ve");
    }

    #[test]
    fn test_media_box_read_from_page() {
        let (mut doc, page_id, font_id) = single_page_doc();
        let mut names = ResourceNames::default();
        let surface = PageSurface::new(&mut doc, page_id, font_id, &mut names);
        assert_eq!(surface.width(), 612.0);
        assert_eq!(surface.height(), 792.0);
    }

    #[test]
    fn test_media_box_inherited_from_parent() {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        if let Ok(dict) = doc.get_object_mut(page_id).unwrap().as_dict_mut() {
            dict.set("Parent", Object::Reference(pages_id));
        }
        assert_eq!(media_box_size(&doc, page_id), Some((595.0, 842.0)));
    }

    #[test]
    fn test_empty_surface_leaves_page_untouched() {
        let (mut doc, page_id, font_id) = single_page_doc();
        let mut names = ResourceNames::default();
        let surface = PageSurface::new(&mut doc, page_id, font_id, &mut names);
        surface.finish().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        assert!(page.get(b"Contents").is_err());
    }

    #[test]
    fn test_fill_rect_emits_re_f() {
        let (mut doc, page_id, font_id) = single_page_doc();
        let mut names = ResourceNames::default();
        let mut surface = PageSurface::new(&mut doc, page_id, font_id, &mut names);
        surface.fill_rect(
            &PageRect {
                x: 10.0,
                y: 20.0,
                width: 100.0,
                height: 50.0,
            },
            Rgba {
                r: 1.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
        );
        surface.finish().unwrap();
        let ops = page_ops(&doc, page_id);
        assert!(ops.contains("1 0 0 rg"));
        assert!(ops.contains("10 20 100 50 re f"));
    }

    #[test]
    fn test_translucent_fill_registers_extgstate() {
        let (mut doc, page_id, font_id) = single_page_doc();
        let mut names = ResourceNames::default();
        let mut surface = PageSurface::new(&mut doc, page_id, font_id, &mut names);
        surface.fill_rect(
            &PageRect {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            },
            Rgba {
                r: 1.0,
                g: 1.0,
                b: 0.0,
                a: 0.4,
            },
        );
        surface.finish().unwrap();
        let ops = page_ops(&doc, page_id);
        assert!(ops.contains("gs"));
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        assert!(resources.has(b"ExtGState"));
    }

    #[test]
    fn test_text_registers_font_resource() {
        let (mut doc, page_id, font_id) = single_page_doc();
        let mut names = ResourceNames::default();
        let mut surface = PageSurface::new(&mut doc, page_id, font_id, &mut names);
        surface.draw_text_line(
            "A note",
            72.0,
            700.0,
            12.0,
            Rgba {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
        );
        surface.finish().unwrap();
        let ops = page_ops(&doc, page_id);
        assert!(ops.contains("BT"));
        assert!(ops.contains("(A note) Tj"));
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert_eq!(fonts.len(), 1);
    }

    #[test]
    fn test_append_preserves_existing_content() {
        let (mut doc, page_id, font_id) = single_page_doc();
        let existing = doc.add_object(Stream::new(dictionary! {}, b"0 0 5 5 re f".to_vec()));
        if let Ok(dict) = doc.get_object_mut(page_id).unwrap().as_dict_mut() {
            dict.set("Contents", Object::Reference(existing));
        }
        let mut names = ResourceNames::default();
        let mut surface = PageSurface::new(&mut doc, page_id, font_id, &mut names);
        surface.fill_rect(
            &PageRect {
                x: 1.0,
                y: 1.0,
                width: 2.0,
                height: 2.0,
            },
            Rgba {
                r: 0.0,
                g: 0.0,
                b: 1.0,
                a: 1.0,
            },
        );
        surface.finish().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].as_reference().unwrap(), existing);
    }

    #[test]
    fn test_resource_names_unique_across_surfaces() {
        let mut names = ResourceNames::default();
        let a = names.allocate("Im");
        let b = names.allocate("Im");
        let c = names.allocate("Gs");
        assert_ne!(a, b);
        assert_ne!(b, c);
    }
}
