//! Serializable card profile for frontend/backend communication.
//!
//! A [`CardProfile`] carries the form inputs as plain JSON so a UI can hand
//! them to the renderer (or the CLI) in one piece.
//!
//! # Example
//!
//! ```
//! use loyalty_card_renderer::CardProfile;
//!
//! let profile = CardProfile::from_json(r##"{"brandName": "Coffee Club", "headerColor": "#7c2d12"}"##).unwrap();
//! assert_eq!(profile.brand_name, "Coffee Club");
//! assert_eq!(profile.barcode_value, "1234567890123");
//! ```

use serde::{Deserialize, Serialize};

use crate::card::CardSpec;
use crate::color::HexColor;
use crate::error::ColorError;

/// The card form inputs in a JSON-friendly format.
///
/// # JSON Format
///
/// ```json
/// {
///   "brandName": "STORE",
///   "barcodeValue": "1234567890123",
///   "headerColor": "#3b82f6",
///   "textIsDark": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct CardProfile {
    pub brand_name: String,
    pub barcode_value: String,
    /// Hex color, `#rrggbb` or `#rgb`.
    pub header_color: String,
    pub text_is_dark: bool,
}

impl Default for CardProfile {
    fn default() -> Self {
        Self::from(&CardSpec::default())
    }
}

impl CardProfile {
    /// Converts to a [`CardSpec`], applying the field length limits.
    pub fn to_spec(&self) -> Result<CardSpec, ColorError> {
        let color = HexColor::parse(&self.header_color)?;
        Ok(CardSpec::new(
            &self.brand_name,
            &self.barcode_value,
            color,
            self.text_is_dark,
        ))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<&CardSpec> for CardProfile {
    fn from(spec: &CardSpec) -> Self {
        Self {
            brand_name: spec.brand_name().to_string(),
            barcode_value: spec.barcode_value().to_string(),
            header_color: spec.header_color.to_string(),
            text_is_dark: spec.text_is_dark,
        }
    }
}
