//! Badwolf color palette.
//!
//! Named colors for output line styling, with RGB triples and `#rrggbb`
//! hex strings.

use std::fmt;

use serde::Serialize;

use crate::error::{MakeupError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parses `#rrggbb` or `rrggbb`, case-insensitive.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(MakeupError::InvalidInput(format!(
                "expected a #rrggbb color, got {hex:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|err| MakeupError::InvalidInput(format!("{hex:?}: {err}")))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn as_tuple(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub name: &'static str,
    pub rgb: Rgb,
}

impl Color {
    const fn new(name: &'static str, r: u8, g: u8, b: u8) -> Self {
        Self {
            name,
            rgb: Rgb::new(r, g, b),
        }
    }

    pub fn hex(&self) -> String {
        self.rgb.to_hex()
    }
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

static BADWOLF: [Color; 23] = [
    Color::new("plain", 0xf8, 0xf6, 0xf2),
    Color::new("snow", 0xff, 0xff, 0xff),
    Color::new("coal", 0x00, 0x00, 0x00),
    Color::new("brightgravel", 0xd9, 0xce, 0xc3),
    Color::new("lightgravel", 0x99, 0x8f, 0x84),
    Color::new("gravel", 0x85, 0x7f, 0x78),
    Color::new("mediumgravel", 0x66, 0x64, 0x62),
    Color::new("deepgravel", 0x45, 0x41, 0x3b),
    Color::new("deepergravel", 0x35, 0x32, 0x2d),
    Color::new("darkgravel", 0x24, 0x23, 0x21),
    Color::new("blackgravel", 0x1c, 0x1b, 0x1a),
    Color::new("blackestgravel", 0x14, 0x14, 0x13),
    Color::new("dalespale", 0xfa, 0xde, 0x3e),
    Color::new("dirtyblonde", 0xf4, 0xcf, 0x86),
    Color::new("taffy", 0xff, 0x2c, 0x4b),
    Color::new("saltwatertaffy", 0x8c, 0xff, 0xba),
    Color::new("tardis", 0x0a, 0x9d, 0xff),
    Color::new("orange", 0xff, 0xa7, 0x24),
    Color::new("lime", 0xae, 0xee, 0x00),
    Color::new("dress", 0xff, 0x9e, 0xb8),
    Color::new("toffee", 0xb8, 0x88, 0x53),
    Color::new("coffee", 0xc7, 0x91, 0x5b),
    Color::new("darkroast", 0x88, 0x63, 0x3f),
];

/// All palette colors in definition order.
pub fn all() -> &'static [Color] {
    &BADWOLF
}

pub fn lookup(name: &str) -> Option<&'static Color> {
    BADWOLF.iter().find(|color| color.name == name)
}

/// Like [`lookup`], but an unknown name is an error.
pub fn resolve(name: &str) -> Result<&'static Color> {
    lookup(name).ok_or_else(|| MakeupError::UnknownColor(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_23_unique_names() {
        let names: std::collections::HashSet<_> = all().iter().map(|c| c.name).collect();
        assert_eq!(all().len(), 23);
        assert_eq!(names.len(), 23);
        assert_eq!(all()[0].name, "plain");
        assert_eq!(all()[22].name, "darkroast");
    }

    #[test]
    fn lookup_by_name() {
        let tardis = lookup("tardis").expect("tardis");
        assert_eq!(tardis.rgb.as_tuple(), (10, 157, 255));
        assert_eq!(tardis.hex(), "#0a9dff");
        assert!(lookup("Tardis").is_none());
        assert!(matches!(resolve("mauve"), Err(MakeupError::UnknownColor(name)) if name == "mauve"));
    }

    #[test]
    fn hex_matches_triples() {
        for color in all() {
            assert_eq!(Rgb::from_hex(&color.hex()).expect("hex"), color.rgb, "{}", color.name);
        }
    }

    #[test]
    fn from_hex_accepts_bare_and_uppercase() {
        assert_eq!(Rgb::from_hex("FF2C4B").expect("hex"), Rgb::new(0xff, 0x2c, 0x4b));
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#zzzzzz").is_err());
        assert!(Rgb::from_hex("#ffé000").is_err());
    }
}
