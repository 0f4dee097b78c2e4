//! Raster payload decoding and PDF image object construction
//!
//! Annotation records carry their raster as a base64 payload, usually
//! wrapped in a `data:` URL. The actual format is sniffed from the decoded
//! magic bytes: PNG pixels are normalized to 8-bit channels and re-emitted
//! as a FlateDecode stream (with the alpha channel split into an SMask);
//! JPEG bytes pass straight through as DCTDecode.

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Object, ObjectId, Stream};
use thiserror::Error;

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("unsupported raster payload ({0})")]
    Unsupported(String),

    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to decode PNG: {0}")]
    Png(#[from] png::DecodingError),

    #[error("failed to compress image data: {0}")]
    Compress(#[from] std::io::Error),

    #[error("truncated or malformed JPEG stream")]
    MalformedJpeg,
}

/// A raster ready to embed: stream payload plus the dictionary facts the
/// image XObject needs.
#[derive(Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    color_space: &'static str,
    filter: &'static str,
    data: Vec<u8>,
    /// Raw 8-bit alpha channel, compressed, when the source had one.
    alpha: Option<Vec<u8>>,
}

/// Decode a base64 payload (with or without a `data:` URL prefix) into an
/// embeddable image.
pub fn decode_payload(payload: &str) -> Result<DecodedImage, RasterError> {
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| RasterError::Unsupported("data URL without payload".to_string()))?,
        None => payload,
    };
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(compact.as_bytes())?;

    if bytes.starts_with(&PNG_MAGIC) {
        decode_png(&bytes)
    } else if bytes.starts_with(&JPEG_MAGIC) {
        decode_jpeg(bytes)
    } else {
        Err(RasterError::Unsupported(
            "magic bytes match neither PNG nor JPEG".to_string(),
        ))
    }
}

impl DecodedImage {
    /// Add this image to the document and return the XObject's id.
    pub fn add_to_document(&self, doc: &mut lopdf::Document) -> ObjectId {
        let smask_id = self.alpha.as_ref().map(|alpha| {
            doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => self.width as i64,
                    "Height" => self.height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                alpha.clone(),
            ))
        });

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => self.width as i64,
            "Height" => self.height as i64,
            "ColorSpace" => self.color_space,
            "BitsPerComponent" => 8,
            "Filter" => self.filter,
        };
        if let Some(id) = smask_id {
            dict.set("SMask", Object::Reference(id));
        }
        doc.add_object(Stream::new(dict, self.data.clone()))
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, RasterError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn decode_png(bytes: &[u8]) -> Result<DecodedImage, RasterError> {
    let mut decoder = png::Decoder::new(bytes);
    // Normalize palettes and 16-bit channels down to plain 8-bit samples.
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let (color_space, data, alpha) = match info.color_type {
        png::ColorType::Rgb => ("DeviceRGB", buf, None),
        png::ColorType::Grayscale => ("DeviceGray", buf, None),
        png::ColorType::Rgba => {
            let mut rgb = Vec::with_capacity(buf.len() / 4 * 3);
            let mut mask = Vec::with_capacity(buf.len() / 4);
            for px in buf.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                mask.push(px[3]);
            }
            ("DeviceRGB", rgb, Some(mask))
        }
        png::ColorType::GrayscaleAlpha => {
            let mut gray = Vec::with_capacity(buf.len() / 2);
            let mut mask = Vec::with_capacity(buf.len() / 2);
            for px in buf.chunks_exact(2) {
                gray.push(px[0]);
                mask.push(px[1]);
            }
            ("DeviceGray", gray, Some(mask))
        }
        other => {
            return Err(RasterError::Unsupported(format!(
                "PNG color type {:?} after expansion",
                other
            )))
        }
    };

    Ok(DecodedImage {
        width: info.width,
        height: info.height,
        color_space,
        filter: "FlateDecode",
        data: deflate(&data)?,
        alpha: alpha.as_deref().map(deflate).transpose()?,
    })
}

fn decode_jpeg(bytes: Vec<u8>) -> Result<DecodedImage, RasterError> {
    let (width, height, components) = jpeg_frame_header(&bytes)?;
    Ok(DecodedImage {
        width,
        height,
        color_space: if components == 1 {
            "DeviceGray"
        } else {
            "DeviceRGB"
        },
        filter: "DCTDecode",
        data: bytes,
        alpha: None,
    })
}

/// Scan JPEG markers for the SOF frame header: `(width, height, components)`.
fn jpeg_frame_header(data: &[u8]) -> Result<(u32, u32, u8), RasterError> {
    let mut i = 2; // past SOI
    while i + 3 < data.len() {
        if data[i] != 0xFF {
            return Err(RasterError::MalformedJpeg);
        }
        let marker = data[i + 1];
        match marker {
            // Fill bytes and standalone markers carry no segment.
            0xFF => i += 1,
            0x01 | 0xD0..=0xD8 => i += 2,
            // SOF0..SOF15, excluding the non-frame C4/C8/CC markers.
            0xC0..=0xCF if marker != 0xC4 && marker != 0xC8 && marker != 0xCC => {
                if i + 9 >= data.len() {
                    return Err(RasterError::MalformedJpeg);
                }
                let height = u32::from(u16::from_be_bytes([data[i + 5], data[i + 6]]));
                let width = u32::from(u16::from_be_bytes([data[i + 7], data[i + 8]]));
                let components = data[i + 9];
                if width == 0 || height == 0 {
                    return Err(RasterError::MalformedJpeg);
                }
                return Ok((width, height, components));
            }
            _ => {
                let len = usize::from(u16::from_be_bytes([data[i + 2], data[i + 3]]));
                if len < 2 {
                    return Err(RasterError::MalformedJpeg);
                }
                i += 2 + len;
            }
        }
    }
    Err(RasterError::MalformedJpeg)
}
