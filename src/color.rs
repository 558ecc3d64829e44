//! Header and text colors.

use std::fmt;
use std::str::FromStr;

use palette::{LinSrgb, Srgb};

use crate::error::ColorError;

/// Text color used when the card is set to dark text.
pub const DARK_TEXT: HexColor = HexColor::rgb(0x1f, 0x29, 0x37);

/// Text color used when the card is set to light text.
pub const LIGHT_TEXT: HexColor = HexColor::rgb(0xff, 0xff, 0xff);

/// An 8-bit sRGB color written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(Srgb<u8>);

impl HexColor {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    /// Parses `#rrggbb` or `#rgb` (the leading `#` is optional).
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        Srgb::<u8>::from_str(trimmed)
            .map(Self)
            .map_err(|_| ColorError {
                input: input.to_string(),
            })
    }

    pub fn components(&self) -> (u8, u8, u8) {
        (self.0.red, self.0.green, self.0.blue)
    }

    /// WCAG relative luminance in 0.0..=1.0.
    pub fn relative_luminance(&self) -> f32 {
        let float: Srgb<f32> = self.0.into_format();
        let linear: LinSrgb = float.into_linear();
        0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
    }

    /// Whether dark text reads better than light text on this background.
    ///
    /// Compares the WCAG contrast ratio against [`DARK_TEXT`] and [`LIGHT_TEXT`].
    pub fn prefers_dark_text(&self) -> bool {
        let bg = self.relative_luminance();
        let contrast = |fg: f32| {
            let (hi, lo) = if fg > bg { (fg, bg) } else { (bg, fg) };
            (hi + 0.05) / (lo + 0.05)
        };
        contrast(DARK_TEXT.relative_luminance()) > contrast(LIGHT_TEXT.relative_luminance())
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::rgb(0x3b, 0x82, 0xf6)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.components();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(HexColor::parse("#3b82f6").unwrap(), HexColor::rgb(0x3b, 0x82, 0xf6));
        assert_eq!(HexColor::parse("#fff").unwrap(), HexColor::rgb(0xff, 0xff, 0xff));
        assert_eq!(HexColor::parse("3B82F6").unwrap().to_string(), "#3b82f6");
    }

    #[test]
    fn rejects_garbage() {
        let err = HexColor::parse("blue-ish").unwrap_err();
        assert_eq!(err.input, "blue-ish");
        assert!(HexColor::parse("#12345").is_err());
    }

    #[test]
    fn display_roundtrip() {
        let color = HexColor::rgb(0x1f, 0x29, 0x37);
        assert_eq!(color.to_string(), "#1f2937");
        assert_eq!(color.to_string().parse::<HexColor>().unwrap(), color);
    }

    #[test]
    fn luminance_extremes() {
        assert!(HexColor::rgb(0, 0, 0).relative_luminance() < 0.001);
        assert!(HexColor::rgb(255, 255, 255).relative_luminance() > 0.999);
    }

    #[test]
    fn contrast_suggestion() {
        assert!(HexColor::rgb(0xfd, 0xe0, 0x47).prefers_dark_text());
        assert!(!HexColor::rgb(0x1e, 0x3a, 0x8a).prefers_dark_text());
    }
}
