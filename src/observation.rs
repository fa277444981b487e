/// Face observations as delivered by the vision collaborator
///
/// An observation is one detected face: a normalized bounding box plus, for landmark
/// requests, named contours of normalized points.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::geometry::{NormalizedPoint, NormalizedRect};

/// Facial regions a landmark request can outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkRegion {
    FaceContour,
    LeftEye,
    RightEye,
    LeftEyebrow,
    RightEyebrow,
    Nose,
    NoseCrest,
    MedianLine,
    OuterLips,
    InnerLips,
    LeftPupil,
    RightPupil,
}

impl LandmarkRegion {
    pub const ALL: [LandmarkRegion; 12] = [
        LandmarkRegion::FaceContour,
        LandmarkRegion::LeftEye,
        LandmarkRegion::RightEye,
        LandmarkRegion::LeftEyebrow,
        LandmarkRegion::RightEyebrow,
        LandmarkRegion::Nose,
        LandmarkRegion::NoseCrest,
        LandmarkRegion::MedianLine,
        LandmarkRegion::OuterLips,
        LandmarkRegion::InnerLips,
        LandmarkRegion::LeftPupil,
        LandmarkRegion::RightPupil,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LandmarkRegion::FaceContour => "face_contour",
            LandmarkRegion::LeftEye => "left_eye",
            LandmarkRegion::RightEye => "right_eye",
            LandmarkRegion::LeftEyebrow => "left_eyebrow",
            LandmarkRegion::RightEyebrow => "right_eyebrow",
            LandmarkRegion::Nose => "nose",
            LandmarkRegion::NoseCrest => "nose_crest",
            LandmarkRegion::MedianLine => "median_line",
            LandmarkRegion::OuterLips => "outer_lips",
            LandmarkRegion::InnerLips => "inner_lips",
            LandmarkRegion::LeftPupil => "left_pupil",
            LandmarkRegion::RightPupil => "right_pupil",
        }
    }
}

impl fmt::Display for LandmarkRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LandmarkRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        LandmarkRegion::ALL
            .into_iter()
            .find(|region| region.name() == wanted)
            .ok_or_else(|| format!("Unknown landmark region '{}'", s))
    }
}

/// Named landmark contours of one face, each an ordered point sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceLandmarks {
    contours: BTreeMap<LandmarkRegion, Vec<NormalizedPoint>>,
}

impl FaceLandmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contour(mut self, region: LandmarkRegion, points: Vec<NormalizedPoint>) -> Self {
        self.contours.insert(region, points);
        self
    }

    /// Points outlining `region`, if the detector reported that region.
    pub fn contour(&self, region: LandmarkRegion) -> Option<&[NormalizedPoint]> {
        self.contours.get(&region).map(Vec::as_slice)
    }

    pub fn regions(&self) -> impl Iterator<Item = LandmarkRegion> + '_ {
        self.contours.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

/// One detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bounding_box: NormalizedRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<FaceLandmarks>,
}

impl FaceObservation {
    pub fn new(bounding_box: NormalizedRect) -> Self {
        Self {
            bounding_box,
            confidence: None,
            landmarks: None,
        }
    }

    pub fn with_landmarks(mut self, landmarks: FaceLandmarks) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    /// Contour for `region`; a face without landmarks has no contours.
    pub fn contour(&self, region: LandmarkRegion) -> Option<&[NormalizedPoint]> {
        self.landmarks.as_ref().and_then(|landmarks| landmarks.contour(region))
    }
}

/// What a completed request handed back.
///
/// `Unrecognized` covers results the renderer has no shape for; receiving one is a
/// contract violation by the collaborator, not a runtime condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Observations {
    Faces(Vec<FaceObservation>),
    Unrecognized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_parsing() {
        assert_eq!("outer_lips".parse::<LandmarkRegion>(), Ok(LandmarkRegion::OuterLips));
        assert_eq!("Left Eyebrow".parse::<LandmarkRegion>(), Ok(LandmarkRegion::LeftEyebrow));
        assert_eq!("nose-crest".parse::<LandmarkRegion>(), Ok(LandmarkRegion::NoseCrest));
        assert!("whiskers".parse::<LandmarkRegion>().is_err());

        for region in LandmarkRegion::ALL {
            assert_eq!(region.name().parse::<LandmarkRegion>(), Ok(region));
        }
    }

    #[test]
    fn test_observation_json() {
        let json = r#"{
            "bounding_box": {"x": 0.25, "y": 0.25, "width": 0.5, "height": 0.5},
            "landmarks": {
                "outer_lips": [{"x": 0.4, "y": 0.3}, {"x": 0.6, "y": 0.3}]
            }
        }"#;
        let observation: FaceObservation = serde_json::from_str(json).unwrap();

        assert_eq!(observation.bounding_box, NormalizedRect::new(0.25, 0.25, 0.5, 0.5));
        assert_eq!(observation.confidence, None);
        assert_eq!(observation.contour(LandmarkRegion::OuterLips).map(<[_]>::len), Some(2));
        assert!(observation.contour(LandmarkRegion::LeftEye).is_none());
    }

    #[test]
    fn test_face_without_landmarks_has_no_contours() {
        let observation = FaceObservation::new(NormalizedRect::unit());
        assert!(observation.contour(LandmarkRegion::OuterLips).is_none());
    }
}
