/// Coordinate conversion between detector space and overlay space
///
/// Detectors report geometry in a normalized unit square with the origin at the
/// bottom-left corner. The overlay surface uses pixel coordinates with the origin at
/// the top-left corner, sized to the displayed image. Everything here is infallible:
/// degenerate or out-of-range input produces degenerate or extrapolated output.
use serde::{Deserialize, Serialize};

/// A point in pixel space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in pixel space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// A rect of the given size anchored at the origin.
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// A point in the detector's unit square (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A region of interest in the detector's unit square (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// The whole unit square.
    pub const fn unit() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

/// Translates a normalized region of interest into the pixel space of `image_bounds`.
///
/// The vertical axis is flipped: the detector's `y` grows upwards from the bottom
/// edge, the returned rect's `y` grows downwards from the top edge. The result is
/// relative to the bounds' own origin, which is also the overlay surface's origin.
pub fn pixel_rect(roi: NormalizedRect, image_bounds: Rect) -> Rect {
    let height = roi.height * image_bounds.height;
    let width = roi.width * image_bounds.width;
    let x = roi.x * image_bounds.width;
    let y = image_bounds.height - (roi.y * image_bounds.height) - height;

    Rect::new(x, y, width, height)
}

/// Translates a single normalized point into the pixel space of `image_bounds`.
pub fn pixel_point(point: NormalizedPoint, image_bounds: Rect) -> Point {
    Point::new(
        point.x * image_bounds.width,
        image_bounds.height - point.y * image_bounds.height,
    )
}
