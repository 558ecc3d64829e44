//! SVG rasterization and PNG encoding using resvg/usvg and image.
//!
//! The card preview is an SVG document; capturing it means rendering that
//! document into an RGBA buffer and encoding the buffer as PNG.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree, fontdb};

use crate::error::CaptureError;
use crate::geometry::SizePx;

pub const PNG_MIME: &str = "image/png";

/// Loads the host's installed fonts for text rendering.
///
/// Without a font database, text elements are skipped by the renderer.
pub fn system_fonts() -> Arc<fontdb::Database> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "loaded system fonts");
    Arc::new(db)
}

/// Renders an SVG document to an RGBA image.
///
/// The output is the document's intrinsic size multiplied by `pixel_ratio`.
pub fn rasterize_svg(
    svg_data: &str,
    pixel_ratio: f32,
    fonts: Option<&Arc<fontdb::Database>>,
) -> Result<RgbaImage, CaptureError> {
    let mut opts = Options::default();
    if let Some(fonts) = fonts {
        opts.fontdb = Arc::clone(fonts);
    }

    let tree = Tree::from_str(svg_data, &opts).map_err(|e| CaptureError::Parse(e.to_string()))?;

    let intrinsic = tree.size();
    let size = SizePx::new(
        intrinsic.width().ceil() as u32,
        intrinsic.height().ceil() as u32,
    )
    .scaled(pixel_ratio);

    let empty = CaptureError::EmptyCanvas {
        width: size.width,
        height: size.height,
    };
    if size.is_empty() {
        return Err(empty);
    }
    let mut pixmap = Pixmap::new(size.width, size.height).ok_or(empty)?;
    let transform = Transform::from_scale(pixel_ratio, pixel_ratio);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Encodes an RGBA image as PNG.
///
/// PNG is lossless, so `quality` (0.0-1.0) only selects the compression
/// effort: higher quality spends more time for smaller files.
pub fn encode_png(image: &RgbaImage, quality: f32) -> Result<Vec<u8>, CaptureError> {
    let compression = if quality >= 0.9 {
        CompressionType::Best
    } else if quality >= 0.5 {
        CompressionType::Default
    } else {
        CompressionType::Fast
    };

    let mut bytes = Vec::new();
    PngEncoder::new_with_quality(&mut bytes, compression, FilterType::Adaptive).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Builds a `data:` URL for inline display of image bytes.
pub fn data_url(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());

    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        // tiny_skia stores premultiplied alpha
        let (r, g, b, a) = unpremultiply(src.red(), src.green(), src.blue(), src.alpha());
        *dst = Rgba([r, g, b, a]);
    }

    img
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        return (0, 0, 0, 0);
    }
    // Integer division rounded to nearest, clamped for malformed input.
    let channel = |c: u8| {
        let a = a as u16;
        ((c as u16 * 255 + a / 2) / a).min(255) as u8
    };
    (channel(r), channel(g), channel(b), a)
}
