//! The card being designed and the export filename derived from it.

use std::sync::LazyLock;

use regex::Regex;

use crate::color::{DARK_TEXT, HexColor, LIGHT_TEXT};

/// Maximum brand name length, in characters.
pub const MAX_BRAND_NAME_CHARS: usize = 20;

/// Maximum barcode value length, in characters.
pub const MAX_BARCODE_CHARS: usize = 13;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// The single in-memory card edited by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSpec {
    brand_name: String,
    barcode_value: String,
    pub header_color: HexColor,
    pub text_is_dark: bool,
}

impl Default for CardSpec {
    fn default() -> Self {
        Self {
            brand_name: "STORE".to_string(),
            barcode_value: "1234567890123".to_string(),
            header_color: HexColor::default(),
            text_is_dark: false,
        }
    }
}

impl CardSpec {
    /// Creates a spec, truncating the text fields to their limits.
    pub fn new(
        brand_name: &str,
        barcode_value: &str,
        header_color: HexColor,
        text_is_dark: bool,
    ) -> Self {
        let mut spec = Self {
            brand_name: String::new(),
            barcode_value: String::new(),
            header_color,
            text_is_dark,
        };
        spec.set_brand_name(brand_name);
        spec.set_barcode_value(barcode_value);
        spec
    }

    pub fn brand_name(&self) -> &str {
        &self.brand_name
    }

    pub fn barcode_value(&self) -> &str {
        &self.barcode_value
    }

    /// Sets the brand name, keeping at most [`MAX_BRAND_NAME_CHARS`] characters.
    pub fn set_brand_name(&mut self, name: &str) {
        self.brand_name = truncate_chars(name, MAX_BRAND_NAME_CHARS);
    }

    /// Sets the barcode value, keeping at most [`MAX_BARCODE_CHARS`] characters.
    pub fn set_barcode_value(&mut self, value: &str) {
        self.barcode_value = truncate_chars(value, MAX_BARCODE_CHARS);
    }

    pub fn text_color(&self) -> HexColor {
        if self.text_is_dark { DARK_TEXT } else { LIGHT_TEXT }
    }

    /// The download filename for this card.
    pub fn filename(&self) -> String {
        export_filename(&self.brand_name)
    }
}

/// Derives `<slug>-card.png` from a brand name.
///
/// The slug is the lowercased name with every whitespace run replaced by a
/// single hyphen. Leading and trailing runs are kept as hyphens too.
pub fn export_filename(brand_name: &str) -> String {
    let lowered = brand_name.to_lowercase();
    let slug = WHITESPACE_RUN.replace_all(&lowered, "-");
    format!("{slug}-card.png")
}

fn truncate_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_from_brand_name() {
        assert_eq!(export_filename("Coffee Club"), "coffee-club-card.png");
        assert_eq!(export_filename("STORE"), "store-card.png");
    }

    #[test]
    fn filename_collapses_whitespace_runs() {
        assert_eq!(export_filename("  A   B  "), "-a-b--card.png");
        assert_eq!(export_filename("Tab\there"), "tab-here-card.png");
    }

    #[test]
    fn filename_for_empty_brand() {
        assert_eq!(export_filename(""), "-card.png");
    }

    #[test]
    fn setters_truncate_to_limits() {
        let mut spec = CardSpec::default();
        spec.set_brand_name("A Very Long Brand Name Indeed");
        assert_eq!(spec.brand_name(), "A Very Long Brand Na");

        spec.set_barcode_value("12345678901234567");
        assert_eq!(spec.barcode_value(), "1234567890123");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let spec = CardSpec::new("ÇÇÇÇÇÇÇÇÇÇÇÇÇÇÇÇÇÇÇÇÇÇ", "1", HexColor::default(), false);
        assert_eq!(spec.brand_name().chars().count(), MAX_BRAND_NAME_CHARS);
    }

    #[test]
    fn text_color_follows_toggle() {
        let mut spec = CardSpec::default();
        assert_eq!(spec.text_color().to_string(), "#ffffff");
        spec.text_is_dark = true;
        assert_eq!(spec.text_color().to_string(), "#1f2937");
    }

    #[test]
    fn default_matches_initial_form() {
        let spec = CardSpec::default();
        assert_eq!(spec.brand_name(), "STORE");
        assert_eq!(spec.barcode_value(), "1234567890123");
        assert_eq!(spec.header_color.to_string(), "#3b82f6");
        assert!(!spec.text_is_dark);
    }
}
