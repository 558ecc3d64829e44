//! Renderer configuration, loadable from TOML.
//!
//! ```toml
//! [barcode]
//! strokeWidth = 2
//! height = 100
//!
//! [export]
//! quality = 0.95
//! pixelRatio = 2.0
//! resetDelayMs = 2000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::barcode::BarcodeOptions;
use crate::error::ConfigError;

/// Settings for capturing and delivering the card image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Raster quality factor (0.0-1.0).
    pub quality: f32,
    /// Device pixel ratio applied to the captured region.
    pub pixel_ratio: f32,
    /// How long the success status is shown before returning to idle.
    pub reset_delay_ms: u64,
    /// Title passed to the native share sheet.
    pub share_title: String,
    /// Load installed fonts so the brand name and label are drawn.
    pub system_fonts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            quality: 0.95,
            pixel_ratio: 1.0,
            reset_delay_ms: 2000,
            share_title: "Save Loyalty Card".to_string(),
            system_fonts: true,
        }
    }
}

impl ExportConfig {
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub barcode: BarcodeOptions,
    pub export: ExportConfig,
}

impl RendererConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
