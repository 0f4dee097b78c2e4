//! Fixed font metrics
//!
//! The engine renders every text run with the document's single embedded
//! Helvetica resource, so this is the one metric function the layout engine
//! needs: standard AFM advance widths in units per 1000 for the printable
//! ASCII range, everything else estimated at the average lowercase advance.

/// Helvetica advance widths for char codes 32..=126, units/1000.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32..47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48..63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64..79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80..95
    222, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96..111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112..126
];

const DEFAULT_WIDTH: u16 = 556;

fn glyph_width(ch: char) -> f64 {
    let code = ch as u32;
    match code {
        32..=126 => f64::from(HELVETICA_WIDTHS[(code - 32) as usize]),
        _ => f64::from(DEFAULT_WIDTH),
    }
}

/// Width of `text` in points when set at `font_size`.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().map(glyph_width).sum::<f64>() * font_size / 1000.0
}
