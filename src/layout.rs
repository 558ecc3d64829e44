//! Card preview layout.
//!
//! The preview region is composed as one SVG document so that the live
//! preview and the exported snapshot come from the same source:
//!
//! ```text
//! ┌──────────────────────────┐  ─┐
//! │   · header color ·       │   │ 120 px, dot pattern at 10% opacity
//! │        BRAND NAME        │   │
//! ├──────────────────────────┤  ─┘
//! │                          │
//! │   ▌▌▌ ▌▌ ▌▌▌▌ ▌ ▌▌▌▌     │  barcode glyph, fitted to the content box
//! │                          │
//! │      1234567890123       │  monospace label
//! └──────────────────────────┘
//!   + diagonal shine overlay
//! ```

use std::fmt::Write as _;

use crate::barcode::BarcodeGlyph;
use crate::card::CardSpec;
use crate::geometry::{RectPx, SizePx};

/// Fixed geometry of the card region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    pub size: SizePx,
    pub corner_radius: f32,
    pub header_height: u32,
    pub brand_font_size: f32,
    /// Box the barcode glyph is fitted into (aspect ratio preserved).
    pub barcode_area: RectPx,
    pub label_baseline: f32,
    pub label_font_size: f32,
    /// Spacing of the header dot pattern.
    pub pattern_spacing: u32,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            size: SizePx::new(320, 400),
            corner_radius: 8.0,
            header_height: 120,
            brand_font_size: 30.0,
            // 32 px section padding + 8 px inner padding on each side,
            // 48 px top padding + 8 px inner padding below the header.
            barcode_area: RectPx::new(40, 176, 240, 100),
            label_baseline: 332.0,
            label_font_size: 24.0,
            pattern_spacing: 40,
        }
    }
}

impl CardLayout {
    /// The whole captured region.
    pub fn region(&self) -> RectPx {
        RectPx::from_size(self.size)
    }

    pub fn header(&self) -> RectPx {
        RectPx::new(0, 0, self.size.width, self.header_height)
    }

    /// Where the glyph lands inside [`barcode_area`](Self::barcode_area).
    ///
    /// Returns `(x, y, scale)`; the glyph is centered horizontally.
    pub fn glyph_placement(&self, glyph: &BarcodeGlyph) -> (f32, f32, f32) {
        let area = self.barcode_area;
        let scale = (area.width as f32 / glyph.width().max(1) as f32)
            .min(area.height as f32 / glyph.height().max(1) as f32);
        let x = area.center_x() - glyph.width() as f32 * scale / 2.0;
        (x, area.y as f32, scale)
    }

    /// Composes the card region as a standalone SVG document.
    ///
    /// `glyph` is whatever the barcode surface currently holds; without one
    /// the barcode area stays blank.
    pub fn compose(&self, spec: &CardSpec, glyph: Option<&BarcodeGlyph>) -> String {
        let SizePx { width, height } = self.size;
        let header = self.header();
        let spacing = self.pattern_spacing;
        let mut svg = String::with_capacity(4096);

        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );

        let _ = write!(
            svg,
            concat!(
                "<defs>",
                r#"<clipPath id="card"><rect width="{w}" height="{h}" rx="{r}" ry="{r}"/></clipPath>"#,
                r#"<pattern id="dots" width="{s}" height="{s}" patternUnits="userSpaceOnUse">"#,
                r##"<circle cx="{c}" cy="{c}" r="2" fill="#ffffff"/></pattern>"##,
                r#"<linearGradient id="shine" x1="0" y1="0" x2="1" y2="1">"#,
                r##"<stop offset="0" stop-color="#ffffff" stop-opacity="0.1"/>"##,
                r##"<stop offset="0.5" stop-color="#ffffff" stop-opacity="0"/>"##,
                "</linearGradient>",
                "</defs>",
            ),
            w = width,
            h = height,
            r = self.corner_radius,
            s = spacing,
            c = spacing / 2,
        );

        svg.push_str(r#"<g clip-path="url(#card)">"#);
        let _ = write!(
            svg,
            r##"<rect width="{width}" height="{height}" fill="#ffffff"/>"##
        );

        // Header block
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            header.x, header.y, header.width, header.height, spec.header_color
        );
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="url(#dots)" opacity="0.1"/>"#,
            header.x, header.y, header.width, header.height
        );
        if !spec.brand_name().is_empty() {
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" font-family="sans-serif" font-size="{}" font-weight="bold" text-anchor="middle" fill="{}">{}</text>"#,
                header.center_x(),
                header.center_y() + self.brand_font_size * 0.35,
                self.brand_font_size,
                spec.text_color(),
                escape_xml(spec.brand_name())
            );
        }

        // Barcode section
        if let Some(glyph) = glyph {
            let (x, y, scale) = self.glyph_placement(glyph);
            let _ = write!(
                svg,
                r#"<g transform="translate({x} {y}) scale({scale})">{}</g>"#,
                glyph.svg_elements()
            );
        }
        if !spec.barcode_value().is_empty() {
            let _ = write!(
                svg,
                r##"<text x="{}" y="{}" font-family="monospace" font-size="{}" text-anchor="middle" fill="#000000">{}</text>"##,
                self.region().center_x(),
                self.label_baseline,
                self.label_font_size,
                escape_xml(spec.barcode_value())
            );
        }

        // Shine overlay
        let _ = write!(
            svg,
            r#"<rect width="{width}" height="{height}" fill="url(#shine)"/>"#
        );

        svg.push_str("</g></svg>");
        svg
    }
}

/// Escapes text for use in SVG character data and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters are not allowed in XML 1.0 text.
            c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::BarcodeOptions;
    use crate::color::HexColor;
    use crate::raster::rasterize_svg;

    fn store_card() -> (CardSpec, BarcodeGlyph) {
        let spec = CardSpec::default();
        let glyph = BarcodeGlyph::encode(spec.barcode_value(), &BarcodeOptions::default()).unwrap();
        (spec, glyph)
    }

    #[test]
    fn escape_special_characters() {
        assert_eq!(escape_xml(r#"A&B <"x">"#), "A&amp;B &lt;&quot;x&quot;&gt;");
        assert_eq!(escape_xml("a\u{0}b"), "ab");
    }

    #[test]
    fn glyph_fits_barcode_area() {
        let (_, glyph) = store_card();
        let layout = CardLayout::default();
        let (x, y, scale) = layout.glyph_placement(&glyph);

        assert!(glyph.width() as f32 * scale <= 240.0 + 0.001);
        assert!(glyph.height() as f32 * scale <= 100.0 + 0.001);
        assert!(x >= 40.0);
        assert_eq!(y, 176.0);
    }

    #[test]
    fn compose_contains_card_parts() {
        let (spec, glyph) = store_card();
        let svg = CardLayout::default().compose(&spec, Some(&glyph));

        assert!(svg.contains(r##"fill="#3b82f6""##));
        assert!(svg.contains(">STORE</text>"));
        assert!(svg.contains(">1234567890123</text>"));
        assert!(svg.contains(r##"fill="#000000"/>"##), "glyph bars present");
        assert!(svg.contains("url(#shine)"));
    }

    #[test]
    fn compose_escapes_brand_name() {
        let spec = CardSpec::new("Fish & <Chips>", "1", HexColor::default(), true);
        let svg = CardLayout::default().compose(&spec, None);
        assert!(svg.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(svg.contains(r##"fill="#1f2937""##));
    }

    #[test]
    fn compose_without_glyph_renders_blank_barcode_area() {
        let spec = CardSpec::new("STORE", "", HexColor::default(), false);
        let layout = CardLayout::default();
        let svg = layout.compose(&spec, None);

        let img = rasterize_svg(&svg, 1.0, None).unwrap();
        assert_eq!((img.width(), img.height()), (320, 400));
        let area = layout.barcode_area;
        let center = img.get_pixel(area.center_x() as u32, area.center_y() as u32);
        assert!(center[0] > 200 && center[1] > 200 && center[2] > 200, "area is white");
    }

    #[test]
    fn composed_card_rasterizes_header_color() {
        let (spec, glyph) = store_card();
        let svg = CardLayout::default().compose(&spec, Some(&glyph));
        let img = rasterize_svg(&svg, 1.0, None).unwrap();

        // Away from the dots and the brand text, the header is close to #3b82f6
        // (lightened slightly by the shine overlay).
        let px = img.get_pixel(290, 90);
        assert!(px[2] > px[0] && px[2] > px[1], "header is blue: {:?}", px);
        assert_eq!(px[3], 255);

        // Rounded corner is transparent.
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }
}
