//! Pixel geometry for the card region and exported artifacts.

/// A rectangle defined in pixel coordinates.
///
/// Used by the card layout to place the header block, the barcode glyph and
/// the barcode label inside the captured region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectPx {
    /// X offset from the left edge of the region
    pub x: u32,
    /// Y offset from the top edge of the region
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RectPx {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a rectangle starting at origin (0, 0) with the given dimensions.
    pub fn from_size(size: SizePx) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }

    /// Horizontal center of the rectangle.
    pub fn center_x(&self) -> f32 {
        self.x as f32 + self.width as f32 / 2.0
    }

    /// Vertical center of the rectangle.
    pub fn center_y(&self) -> f32 {
        self.y as f32 + self.height as f32 / 2.0
    }
}

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scales both dimensions by a device pixel ratio, rounding up.
    ///
    /// A 320x400 region captured at ratio 2.0 yields a 640x800 raster.
    pub fn scaled(&self, ratio: f32) -> Self {
        Self {
            width: (self.width as f32 * ratio).ceil() as u32,
            height: (self.height as f32 * ratio).ceil() as u32,
        }
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
