//! Color string parsing
//!
//! Turns a user-supplied color string into normalized RGBA components in
//! the [0, 1] range. Unparsable input falls back to a fixed opaque warm
//! yellow instead of erroring: a garbled style must never abort an export.

/// A color with unit-range components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// Substituted for any color string the parser cannot understand (#ffcc00).
pub const FALLBACK_COLOR: Rgba = Rgba {
    r: 1.0,
    g: 0.8,
    b: 0.0,
    a: 1.0,
};

/// Parse `#rgb`, `#rrggbb`, `rgb(r,g,b)` or `rgba(r,g,b,a)`.
///
/// Channel values are integers in 0-255, alpha an optional float; hex colors
/// are always opaque. Pure and deterministic; never fails.
pub fn parse_color(input: &str) -> Rgba {
    let trimmed = input.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex).unwrap_or(FALLBACK_COLOR);
    }
    if let Some(args) = trimmed
        .strip_prefix("rgba(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_channels(args, true).unwrap_or(FALLBACK_COLOR);
    }
    if let Some(args) = trimmed
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_channels(args, false).unwrap_or(FALLBACK_COLOR);
    }
    FALLBACK_COLOR
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let (r, g, b) = match hex.len() {
        3 => {
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 1], 16)
                    .ok()
                    .map(|v| (v * 16 + v) as f64 / 255.0)
            };
            (channel(0)?, channel(1)?, channel(2)?)
        }
        6 => {
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .ok()
                    .map(|v| v as f64 / 255.0)
            };
            (channel(0)?, channel(2)?, channel(4)?)
        }
        _ => return None,
    };
    Some(Rgba { r, g, b, a: 1.0 })
}

fn parse_channels(args: &str, with_alpha: bool) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }
    let channel = |s: &str| s.parse::<u32>().ok().map(|v| v.min(255) as f64 / 255.0);
    let a = if with_alpha {
        parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0)
    } else {
        1.0
    };
    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_6() {
        let c = parse_color("#ff0000");
        assert_eq!(c, Rgba { r: 1.0, g: 0.0, b: 0.0, a: 1.0 });
    }

    #[test]
    fn test_hex_3_expands_digits() {
        let c = parse_color("#fff");
        assert_eq!(c, Rgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 });

        // #abc == #aabbcc
        assert_eq!(parse_color("#abc"), parse_color("#aabbcc"));
    }

    #[test]
    fn test_rgb() {
        let c = parse_color("rgb(0, 128, 255)");
        assert!((c.g - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_rgba_with_alpha() {
        let c = parse_color("rgba(255,0,0,0.5)");
        assert_eq!(c, Rgba { r: 1.0, g: 0.0, b: 0.0, a: 0.5 });
    }

    #[test]
    fn test_unparsable_falls_back() {
        assert_eq!(parse_color("not-a-color"), FALLBACK_COLOR);
        assert_eq!(parse_color(""), FALLBACK_COLOR);
        assert_eq!(parse_color("#12"), FALLBACK_COLOR);
        assert_eq!(parse_color("#zzzzzz"), FALLBACK_COLOR);
        assert_eq!(parse_color("rgb(1,2)"), FALLBACK_COLOR);
        assert_eq!(parse_color("rgba(1,2,3)"), FALLBACK_COLOR);
        assert_eq!(parse_color("hsl(10, 50%, 50%)"), FALLBACK_COLOR);
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        let c = parse_color("rgba(300, 0, 0, 2.0)");
        assert_eq!(c, Rgba { r: 1.0, g: 0.0, b: 0.0, a: 1.0 });
    }

    #[test]
    fn test_whitespace_tolerated() {
        let c = parse_color("  rgba( 10 , 20 , 30 , 0.25 )  ");
        assert!((c.a - 0.25).abs() < 1e-12);
    }
}
