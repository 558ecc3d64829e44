//! Barcode encoder and the reusable drawing surface it renders into.
//!
//! The surface tracks a version number that increments on every successful
//! redraw, the same way pipeline layers track config changes. A value that
//! fails to encode leaves the previous glyph (and version) untouched.

pub mod code128;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;
use crate::layout::escape_xml;

// ============================================================================
// BarcodeOptions
// ============================================================================

/// Fixed encoding parameters for the card barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarcodeOptions {
    /// Width of the narrowest bar in pixels.
    pub stroke_width: u32,
    /// Bar height in pixels.
    pub height: u32,
    /// Quiet zone on every side, in pixels.
    pub margin: u32,
    /// Draw the encoded value as a caption under the bars.
    pub display_value: bool,
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self {
            stroke_width: 2,
            height: 100,
            margin: 0,
            display_value: false,
        }
    }
}

const CAPTION_FONT_SIZE: u32 = 20;
const CAPTION_GAP: u32 = 2;

// ============================================================================
// BarcodeGlyph
// ============================================================================

/// A rendered Code 128 barcode.
///
/// Holds the module row derived from the value and knows how to draw itself
/// as SVG. Glyphs are immutable; a new value produces a new glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeGlyph {
    value: String,
    symbols: Vec<u8>,
    modules: Vec<bool>,
    options: BarcodeOptions,
}

impl BarcodeGlyph {
    /// Encodes `value` under `options`.
    pub fn encode(value: &str, options: &BarcodeOptions) -> Result<Self, EncodingError> {
        let symbols = code128::encode(value)?;
        let modules = code128::modules(&symbols);
        Ok(Self {
            value: value.to_string(),
            symbols,
            modules,
            options: options.clone(),
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Symbol values including start, checksum and stop.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Bar (`true`) / space (`false`) modules, left to right.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn options(&self) -> &BarcodeOptions {
        &self.options
    }

    /// Total width in pixels, margins included.
    pub fn width(&self) -> u32 {
        self.modules.len() as u32 * self.options.stroke_width + 2 * self.options.margin
    }

    /// Total height in pixels, margins and caption included.
    pub fn height(&self) -> u32 {
        let caption = if self.options.display_value {
            CAPTION_GAP + CAPTION_FONT_SIZE
        } else {
            0
        };
        self.options.height + caption + 2 * self.options.margin
    }

    /// Returns true if the glyph has at least one bar.
    pub fn has_bars(&self) -> bool {
        self.modules.iter().any(|&bar| bar)
    }

    /// SVG elements for the glyph in its own coordinate space (origin top-left).
    ///
    /// Adjacent bar modules are merged into a single rect.
    pub fn svg_elements(&self) -> String {
        let stroke = self.options.stroke_width;
        let margin = self.options.margin;
        let mut out = String::new();
        let _ = write!(
            out,
            r##"<rect x="0" y="0" width="{}" height="{}" fill="#ffffff"/>"##,
            self.width(),
            self.height()
        );

        let mut start = None;
        for (index, &bar) in self.modules.iter().chain(std::iter::once(&false)).enumerate() {
            match (bar, start) {
                (true, None) => start = Some(index),
                (false, Some(first)) => {
                    let _ = write!(
                        out,
                        r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#000000"/>"##,
                        margin + first as u32 * stroke,
                        margin,
                        (index - first) as u32 * stroke,
                        self.options.height
                    );
                    start = None;
                }
                _ => {}
            }
        }

        if self.options.display_value {
            let _ = write!(
                out,
                r##"<text x="{}" y="{}" font-family="monospace" font-size="{}" text-anchor="middle" fill="#000000">{}</text>"##,
                self.width() as f32 / 2.0,
                margin + self.options.height + CAPTION_GAP + CAPTION_FONT_SIZE,
                CAPTION_FONT_SIZE,
                escape_xml(&self.value)
            );
        }
        out
    }

    /// Standalone SVG document for the glyph.
    pub fn to_svg(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#,
            w = self.width(),
            h = self.height(),
            body = self.svg_elements()
        )
    }
}

// ============================================================================
// BarcodeSurface
// ============================================================================

/// The drawing surface owned by the card preview.
///
/// [`render`](Self::render) is called on every barcode value change,
/// including partial input while typing. Failures are logged and absorbed.
#[derive(Debug, Default)]
pub struct BarcodeSurface {
    options: BarcodeOptions,
    glyph: Option<BarcodeGlyph>,
    version: u64,
}

impl BarcodeSurface {
    pub fn new(options: BarcodeOptions) -> Self {
        Self {
            options,
            glyph: None,
            version: 0,
        }
    }

    pub fn options(&self) -> &BarcodeOptions {
        &self.options
    }

    /// The last glyph that encoded successfully, if any.
    pub fn glyph(&self) -> Option<&BarcodeGlyph> {
        self.glyph.as_ref()
    }

    /// Increments on every successful redraw.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Encodes `value` and replaces the surface contents.
    ///
    /// Returns true if the surface changed. An invalid value is logged and
    /// leaves the previous glyph in place; re-rendering the current value is
    /// a no-op.
    pub fn render(&mut self, value: &str) -> bool {
        if self.glyph.as_ref().is_some_and(|g| g.value() == value) {
            return false;
        }

        match BarcodeGlyph::encode(value, &self.options) {
            Ok(glyph) => {
                tracing::debug!(value, width = glyph.width(), "barcode redrawn");
                self.glyph = Some(glyph);
                self.version = self.version.wrapping_add(1);
                true
            }
            Err(error) => {
                tracing::warn!(value, %error, "invalid barcode value, keeping previous glyph");
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
