//! Error types for the rendering-and-export pipeline.
//!
//! None of these errors are fatal: encoding errors are absorbed by the
//! barcode surface, capture and delivery errors reset the export status.

use std::io;

use thiserror::Error;

/// The barcode value cannot be expressed in Code 128.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("barcode value is empty")]
    Empty,

    #[error("character {ch:?} at index {index} is not encodable in Code 128")]
    UnsupportedCharacter { ch: char, index: usize },
}

/// Rasterizing the card region failed.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to parse card SVG: {0}")]
    Parse(String),

    #[error("cannot allocate a {width}x{height} canvas")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Handing the artifact to the user failed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("share was cancelled by the user")]
    Cancelled,

    #[error("native share is not available on this platform")]
    ShareUnavailable,

    #[error("platform rejected the request: {0}")]
    Platform(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The result of one failed export cycle.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// A header color string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color {input:?}, expected #rrggbb or #rgb")]
pub struct ColorError {
    pub input: String,
}

/// Loading a [`RendererConfig`](crate::RendererConfig) failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}
