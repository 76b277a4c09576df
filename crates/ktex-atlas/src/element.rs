//! Atlas rectangles in UV and pixel space.

/// Half-pixel bias of the atlas tool's normalized coordinates.
pub const HALF_PIXEL_MARGIN: f64 = 0.5;

/// A normalized rectangle as stored in the sidecar.
///
/// `u` runs left to right, `v` runs bottom to top (`v = 0` is the bottom row).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UvRect {
    pub u1: f64,
    pub v1: f64,
    pub u2: f64,
    pub v2: f64,
}

impl UvRect {
    pub fn new(u1: f64, v1: f64, u2: f64, v2: f64) -> Self {
        Self { u1, v1, u2, v2 }
    }

    /// Convert to a top-left origin, y-down pixel rectangle for a texture of
    /// `width` x `height`.
    ///
    /// Values are truncated toward zero and are not clamped, so the result can
    /// extend past the texture edges or have a negative extent.
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let width = width as f64;
        let height = height as f64;

        let v1 = 1.0 - self.v1;
        let v2 = 1.0 - self.v2;

        PixelRect {
            x: (self.u1 * width - HALF_PIXEL_MARGIN) as i32,
            y: (v2 * height - HALF_PIXEL_MARGIN) as i32,
            width: ((self.u2 - self.u1) * width) as i32,
            height: ((v1 - v2) * height) as i32,
        }
    }
}

/// Pixel rectangle, top-left origin, y down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Inclusive point test, edges count as inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64
            && x <= (self.x + self.width) as f64
            && y >= self.y as f64
            && y <= (self.y + self.height) as f64
    }

    /// Intersect with a `width` x `height` image.
    ///
    /// Returns `(x, y, width, height)` in unsigned pixels, or `None` when
    /// nothing of the rectangle lies inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let left = (self.x as i64).clamp(0, width as i64);
        let top = (self.y as i64).clamp(0, height as i64);
        let right = (self.x as i64 + self.width as i64).clamp(0, width as i64);
        let bottom = (self.y as i64 + self.height as i64).clamp(0, height as i64);

        if right <= left || bottom <= top {
            return None;
        }
        Some((
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

/// A named sub-rectangle of the decoded texture.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AtlasElement {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub rect: PixelRect,
}

impl AtlasElement {
    pub fn new(name: impl Into<String>, rect: PixelRect) -> Self {
        Self {
            name: name.into(),
            rect,
        }
    }

    pub fn x(&self) -> i32 {
        self.rect.x
    }

    pub fn y(&self) -> i32 {
        self.rect.y
    }

    pub fn width(&self) -> i32 {
        self.rect.width
    }

    pub fn height(&self) -> i32 {
        self.rect.height
    }
}

impl std::fmt::Display for AtlasElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}x{})", self.name, self.rect.width, self.rect.height)
    }
}
