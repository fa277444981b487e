/// Turns face observations into overlay annotations
///
/// Box and landmark passes each append through a single surface transaction.
use log::{debug, trace};

use super::annotation::{Annotation, BoxAnnotation, Color, Label, PathAnnotation, Stroke, TextAlignment};
use super::surface::OverlaySurface;
use crate::config::{
    DEFAULT_BOX_BORDER_WIDTH, DEFAULT_LABEL_FONT_SCALE, DEFAULT_LANDMARK_LINE_WIDTH,
};
use crate::geometry::{pixel_point, pixel_rect, Rect};
use crate::observation::{FaceObservation, LandmarkRegion};

/// Visual style for annotations
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub box_border: Stroke,
    /// Text centered in each face box; no label is drawn when unset.
    pub label_text: Option<String>,
    /// Label font size as a fraction of the box height
    pub label_font_scale: f32,
    pub landmark_stroke: Stroke,
    /// Contours drawn by the landmark pass, in drawing order
    pub landmark_regions: Vec<LandmarkRegion>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            box_border: Stroke::new(Color::BLUE, DEFAULT_BOX_BORDER_WIDTH),
            label_text: None,
            label_font_scale: DEFAULT_LABEL_FONT_SCALE,
            landmark_stroke: Stroke::new(Color::BLUE, DEFAULT_LANDMARK_LINE_WIDTH),
            landmark_regions: vec![LandmarkRegion::OuterLips],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn box_annotation(&self, observation: &FaceObservation, image_bounds: Rect) -> BoxAnnotation {
        let frame = pixel_rect(observation.bounding_box, image_bounds);
        let label = self.style.label_text.as_ref().map(|text| Label {
            text: text.clone(),
            font_size: self.style.label_font_scale * frame.height,
            alignment: TextAlignment::Center,
        });

        BoxAnnotation {
            frame,
            border: self.style.box_border,
            fill: Color::TRANSPARENT,
            label,
        }
    }

    /// Path annotations for every configured region the face has a non-empty contour for.
    pub fn landmark_annotations(&self, observation: &FaceObservation, image_bounds: Rect) -> Vec<PathAnnotation> {
        self.style
            .landmark_regions
            .iter()
            .filter_map(|&region| {
                let contour = observation.contour(region)?;
                let points = contour.iter().map(|&p| pixel_point(p, image_bounds)).collect();
                PathAnnotation::new(region, image_bounds, points, self.style.landmark_stroke)
            })
            .collect()
    }

    /// Appends one box per observation. Returns the number of boxes added.
    pub fn render_face_boxes(
        &self,
        observations: &[FaceObservation],
        image_bounds: Rect,
        surface: &mut OverlaySurface,
    ) -> usize {
        let mut tx = surface.begin();
        for observation in observations {
            let annotation = self.box_annotation(observation, image_bounds);
            trace!("Face box {:?} (confidence {:?})", annotation.frame, observation.confidence);
            tx.push(Annotation::Box(annotation));
        }
        let added = tx.commit();

        debug!("Rendered {} face box(es)", added);
        added
    }

    /// Appends one path per non-empty landmark contour. Returns the number of paths added.
    pub fn render_landmark_paths(
        &self,
        observations: &[FaceObservation],
        image_bounds: Rect,
        surface: &mut OverlaySurface,
    ) -> usize {
        let mut tx = surface.begin();
        for observation in observations {
            for path in self.landmark_annotations(observation, image_bounds) {
                trace!("{} path through {} point(s)", path.region, path.points.len());
                tx.push(Annotation::Path(path));
            }
        }
        let added = tx.commit();

        debug!("Rendered {} landmark path(s) for {} face(s)", added, observations.len());
        added
    }

    pub fn clear(&self, surface: &mut OverlaySurface) {
        surface.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{NormalizedPoint, NormalizedRect, Point};
    use crate::observation::FaceLandmarks;
    use approx::assert_relative_eq;

    fn lips() -> Vec<NormalizedPoint> {
        vec![
            NormalizedPoint::new(0.4, 0.3),
            NormalizedPoint::new(0.5, 0.25),
            NormalizedPoint::new(0.6, 0.3),
        ]
    }

    fn face_with_lips(points: Vec<NormalizedPoint>) -> FaceObservation {
        FaceObservation::new(NormalizedRect::new(0.25, 0.25, 0.5, 0.5))
            .with_landmarks(FaceLandmarks::new().with_contour(LandmarkRegion::OuterLips, points))
    }

    #[test]
    fn test_render_face_boxes_scenario() {
        let bounds = Rect::from_size(200.0, 100.0);
        let mut surface = OverlaySurface::new(bounds);
        let renderer = OverlayRenderer::default();

        let added = renderer.render_face_boxes(
            &[FaceObservation::new(NormalizedRect::new(0.25, 0.25, 0.5, 0.5))],
            bounds,
            &mut surface,
        );

        assert_eq!(added, 1);
        match &surface.annotations()[0] {
            Annotation::Box(b) => {
                assert_eq!(b.frame, Rect::new(50.0, 25.0, 100.0, 50.0));
                assert_eq!(b.border, Stroke::new(Color::BLUE, 1.0));
                assert_eq!(b.fill, Color::TRANSPARENT);
                assert!(b.label.is_none());
            }
            other => panic!("expected a box, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_is_one_commit() {
        let bounds = Rect::from_size(640.0, 480.0);
        let mut surface = OverlaySurface::new(bounds);
        let receiver = surface.subscribe();
        let observations: Vec<_> = (0..7)
            .map(|i| FaceObservation::new(NormalizedRect::new(i as f32 * 0.1, 0.1, 0.1, 0.1)))
            .collect();

        OverlayRenderer::default().render_face_boxes(&observations, bounds, &mut surface);

        assert_eq!(surface.box_count(), 7);
        assert_eq!(surface.path_count(), 0);
        assert_eq!(surface.revision(), 1);
        assert_eq!(receiver.borrow().box_count(), 7);
    }

    #[test]
    fn test_label_scales_with_box_height() {
        let style = OverlayStyle {
            label_text: Some("face".to_string()),
            ..OverlayStyle::default()
        };
        let renderer = OverlayRenderer::new(style);
        let annotation = renderer.box_annotation(
            &FaceObservation::new(NormalizedRect::new(0.0, 0.0, 0.5, 0.4)),
            Rect::from_size(100.0, 100.0),
        );

        let label = annotation.label.unwrap();
        assert_eq!(label.text, "face");
        assert_eq!(label.alignment, TextAlignment::Center);
        assert_relative_eq!(label.font_size, 36.0, epsilon = 1e-4);
    }

    #[test]
    fn test_landmark_paths_follow_contour_order() {
        let bounds = Rect::from_size(200.0, 100.0);
        let mut surface = OverlaySurface::new(bounds);

        let added = OverlayRenderer::default().render_landmark_paths(&[face_with_lips(lips())], bounds, &mut surface);

        assert_eq!(added, 1);
        match &surface.annotations()[0] {
            Annotation::Path(path) => {
                assert_eq!(path.region, LandmarkRegion::OuterLips);
                assert_eq!(path.frame, bounds);
                assert_eq!(path.stroke.width, 2.0);
                let expected = [Point::new(80.0, 70.0), Point::new(100.0, 75.0), Point::new(120.0, 70.0)];
                assert_eq!(path.points.len(), expected.len());
                for (got, want) in path.points.iter().zip(expected) {
                    assert_relative_eq!(got.x, want.x, epsilon = 1e-3);
                    assert_relative_eq!(got.y, want.y, epsilon = 1e-3);
                }
            }
            other => panic!("expected a path, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_contour_adds_nothing() {
        let bounds = Rect::from_size(200.0, 100.0);
        let mut surface = OverlaySurface::new(bounds);
        let renderer = OverlayRenderer::default();

        let observations = [
            face_with_lips(Vec::new()),
            FaceObservation::new(NormalizedRect::unit()),
        ];
        assert_eq!(renderer.render_landmark_paths(&observations, bounds, &mut surface), 0);
        assert_eq!(renderer.render_landmark_paths(&[], bounds, &mut surface), 0);
        assert!(surface.is_empty());
        assert_eq!(surface.revision(), 0);
    }

    #[test]
    fn test_only_configured_regions_are_drawn() {
        let bounds = Rect::from_size(100.0, 100.0);
        let mut surface = OverlaySurface::new(bounds);
        let face = FaceObservation::new(NormalizedRect::unit()).with_landmarks(
            FaceLandmarks::new()
                .with_contour(LandmarkRegion::OuterLips, lips())
                .with_contour(LandmarkRegion::LeftEye, lips())
                .with_contour(LandmarkRegion::Nose, lips()),
        );
        let renderer = OverlayRenderer::new(OverlayStyle {
            landmark_regions: vec![LandmarkRegion::Nose, LandmarkRegion::LeftEye],
            ..OverlayStyle::default()
        });

        renderer.render_landmark_paths(&[face], bounds, &mut surface);

        let regions: Vec<_> = surface
            .annotations()
            .iter()
            .filter_map(|a| match a {
                Annotation::Path(p) => Some(p.region),
                Annotation::Box(_) => None,
            })
            .collect();
        assert_eq!(regions, vec![LandmarkRegion::Nose, LandmarkRegion::LeftEye]);
    }

    #[test]
    fn test_clear_before_second_pass() {
        let bounds = Rect::from_size(100.0, 100.0);
        let mut surface = OverlaySurface::new(bounds);
        let renderer = OverlayRenderer::default();
        let faces = [FaceObservation::new(NormalizedRect::unit())];

        renderer.render_face_boxes(&faces, bounds, &mut surface);
        renderer.clear(&mut surface);
        renderer.render_face_boxes(&faces, bounds, &mut surface);
        assert_eq!(surface.box_count(), 1);
    }
}
