/// Drawable overlay shapes
///
/// Annotations carry pixel-space geometry relative to the overlay surface and the
/// style to stroke them with. They are built once and never mutated afterwards.
use lyon_algorithms::aabb::bounding_box;
use lyon_algorithms::path::math::point;
use lyon_algorithms::path::Path;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::observation::LandmarkRegion;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLUE: Color = Color::from_rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return None;
        }

        let channel = |i: usize| -> Option<f32> {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };

        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 1.0 },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

/// Text drawn inside a box annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub font_size: f32,
    pub alignment: TextAlignment,
}

/// Border-only rectangle around a detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxAnnotation {
    pub frame: Rect,
    pub border: Stroke,
    pub fill: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

/// Open polyline through one landmark contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathAnnotation {
    pub region: LandmarkRegion,
    /// Layer frame the points are laid out in, equal to the image bounds.
    pub frame: Rect,
    pub points: Vec<Point>,
    pub stroke: Stroke,
}

impl PathAnnotation {
    /// `None` for an empty contour; there is nothing to move to.
    pub fn new(region: LandmarkRegion, frame: Rect, points: Vec<Point>, stroke: Stroke) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        Some(Self {
            region,
            frame,
            points,
            stroke,
        })
    }

    /// Vector path: move to the first point, then a line to each following point.
    ///
    /// The path is left open; a closed outline only happens when the contour itself
    /// repeats its first point.
    pub fn to_path(&self) -> Path {
        let mut builder = Path::builder();
        let mut points = self.points.iter();

        if let Some(first) = points.next() {
            builder.begin(point(first.x, first.y));
            for p in points {
                builder.line_to(point(p.x, p.y));
            }
            builder.end(false);
        }

        builder.build()
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Axis-aligned bounds of the stroked centerline.
    pub fn bounds(&self) -> Rect {
        let aabb = bounding_box(self.to_path().iter());
        Rect::new(aabb.min.x, aabb.min.y, aabb.width(), aabb.height())
    }
}

/// One drawable shape on the overlay surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    Box(BoxAnnotation),
    Path(PathAnnotation),
}

impl Annotation {
    pub fn is_box(&self) -> bool {
        matches!(self, Annotation::Box(_))
    }

    pub fn is_path(&self) -> bool {
        matches!(self, Annotation::Path(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon_algorithms::path::PathEvent;

    fn stroke() -> Stroke {
        Stroke::new(Color::BLUE, 2.0)
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#0000ff"), Some(Color::BLUE));
        assert_eq!(Color::from_hex("#FF000080").map(|c| c.r), Some(1.0));
        assert!(Color::from_hex("0000ff").is_none());
        assert!(Color::from_hex("#00f").is_none());
        assert!(Color::from_hex("#gg0000").is_none());
    }

    #[test]
    fn test_empty_contour_has_no_path() {
        let frame = Rect::from_size(10.0, 10.0);
        assert!(PathAnnotation::new(LandmarkRegion::OuterLips, frame, Vec::new(), stroke()).is_none());
    }

    #[test]
    fn test_path_moves_then_lines_in_order() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 5.0)];
        let annotation =
            PathAnnotation::new(LandmarkRegion::OuterLips, Rect::from_size(20.0, 20.0), points, stroke())
                .unwrap();

        let events: Vec<PathEvent> = annotation.to_path().iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], PathEvent::Begin { at } if at == point(0.0, 0.0)));
        assert!(matches!(events[1], PathEvent::Line { to, .. } if to == point(10.0, 0.0)));
        assert!(matches!(events[2], PathEvent::Line { to, .. } if to == point(10.0, 5.0)));
        assert!(matches!(events[3], PathEvent::End { close: false, .. }));
        assert_eq!(annotation.segment_count(), 2);
    }

    #[test]
    fn test_single_point_path() {
        let annotation = PathAnnotation::new(
            LandmarkRegion::LeftPupil,
            Rect::from_size(20.0, 20.0),
            vec![Point::new(3.0, 4.0)],
            stroke(),
        )
        .unwrap();
        assert_eq!(annotation.segment_count(), 0);
        assert_eq!(annotation.to_path().iter().count(), 2);
    }

    #[test]
    fn test_path_bounds() {
        let points = vec![Point::new(2.0, 8.0), Point::new(12.0, 3.0), Point::new(6.0, 10.0)];
        let annotation =
            PathAnnotation::new(LandmarkRegion::Nose, Rect::from_size(20.0, 20.0), points, stroke()).unwrap();
        assert_eq!(annotation.bounds(), Rect::new(2.0, 3.0, 10.0, 7.0));
    }
}
