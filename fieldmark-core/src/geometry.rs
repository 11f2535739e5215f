//! Pixel and percentage geometry.
//!
//! Field geometry is stored as percentages of the page surface's rendered
//! client size, so a record survives zoom and re-render. Everything in this
//! module is pure arithmetic; callers must make sure the page is laid out
//! (non-zero client size) before converting.

use serde::{Deserialize, Serialize};

/// A point in window-client, content, or page-local pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendered client size of a page surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Client width in pixels.
    pub width: f64,
    /// Client height in pixels.
    pub height: f64,
}

impl PageSize {
    /// Create a new page size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether the page has a usable basis for percentage conversion.
    #[must_use]
    pub fn is_laid_out(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A rectangle in page-local pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    /// Distance from the page's top edge.
    pub top: f64,
    /// Distance from the page's left edge.
    pub left: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl PixelRect {
    /// Create a new pixel rectangle.
    #[must_use]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether the point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }
}

/// Field geometry as percentages of the page client size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldProperties {
    /// Top offset, percent of page height.
    pub top: f64,
    /// Left offset, percent of page width.
    pub left: f64,
    /// Width, percent of page width.
    pub width: f64,
    /// Height, percent of page height.
    pub height: f64,
}

impl FieldProperties {
    /// Create new percentage geometry.
    #[must_use]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }
}

/// Convert a page-local pixel rectangle to page percentages.
///
/// The page must be laid out; a zero extent yields non-finite values.
#[must_use]
pub fn to_percent(rect: PixelRect, page: PageSize) -> FieldProperties {
    debug_assert!(page.is_laid_out(), "percentage basis must be non-zero");
    FieldProperties {
        top: rect.top / page.height * 100.0,
        left: rect.left / page.width * 100.0,
        width: rect.width / page.width * 100.0,
        height: rect.height / page.height * 100.0,
    }
}

/// Convert page percentages back to page-local pixels.
#[must_use]
pub fn to_pixels(props: FieldProperties, page: PageSize) -> PixelRect {
    PixelRect {
        top: props.top * page.height / 100.0,
        left: props.left * page.width / 100.0,
        width: props.width * page.width / 100.0,
        height: props.height * page.height / 100.0,
    }
}

/// Span between a fixed anchor and the pointer along one axis.
///
/// Returns `(origin, size)` in page-local pixels. The anchor is first pinned
/// to `[0, extent]`. When the pointer moves past the anchor in the positive
/// direction the size is capped by the extent left after the anchor; in the
/// negative direction the origin stops at the page edge, so the far edge
/// never leaves `[0, extent]`.
#[must_use]
pub fn clamped_span(anchor: f64, pointer: f64, extent: f64) -> (f64, f64) {
    let anchor = anchor.max(0.0).min(extent);
    if pointer > anchor {
        let size = (pointer - anchor).min(extent - anchor);
        (anchor, size)
    } else {
        let origin = pointer.max(0.0).min(anchor);
        (origin, anchor - origin)
    }
}

/// Keep a span of `size` starting at `position` inside `[0, extent]`.
#[must_use]
pub fn clamp_position(position: f64, size: f64, extent: f64) -> f64 {
    position.min(extent - size).max(0.0)
}
