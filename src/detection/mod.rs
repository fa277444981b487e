/// Detection requests and the vision collaborator seam
///
/// The actual face and landmark detection lives behind the `FaceDetector` trait.
/// This crate only builds requests, runs them off the display context and routes
/// each request's completion back.
pub mod dispatcher;
pub mod replay;

use std::fmt;
use std::str::FromStr;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::DetectionError;
use crate::observation::Observations;

pub use dispatcher::DetectionDispatcher;
pub use replay::{RecordedResult, ReplayDetector, ReplayFixture};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    FaceRectangles,
    FaceLandmarks,
}

impl AnalysisKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::FaceRectangles => "face_rectangles",
            AnalysisKind::FaceLandmarks => "face_landmarks",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "face_rectangles" | "rectangles" => Ok(AnalysisKind::FaceRectangles),
            "face_landmarks" | "landmarks" => Ok(AnalysisKind::FaceLandmarks),
            _ => Err(format!("Unknown analysis kind '{}'", s)),
        }
    }
}

/// One analysis to run against an image. Built once at setup and passed by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetectionRequest {
    pub kind: AnalysisKind,
}

impl DetectionRequest {
    pub const fn new(kind: AnalysisKind) -> Self {
        Self { kind }
    }

    pub const fn face_rectangles() -> Self {
        Self::new(AnalysisKind::FaceRectangles)
    }

    pub const fn face_landmarks() -> Self {
        Self::new(AnalysisKind::FaceLandmarks)
    }
}

/// The outcome of one request: observations, or why there are none.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub kind: AnalysisKind,
    pub result: Result<Observations, DetectionError>,
}

impl Completion {
    pub fn success(kind: AnalysisKind, observations: Observations) -> Self {
        Self {
            kind,
            result: Ok(observations),
        }
    }

    pub fn failure(kind: AnalysisKind, error: DetectionError) -> Self {
        Self {
            kind,
            result: Err(error),
        }
    }
}

/// An already-decoded bitmap handed to the detector.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
}

impl SourceImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// A blank RGBA bitmap of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(DynamicImage::new_rgba8(width, height))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.image
    }
}

impl From<DynamicImage> for SourceImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}

/// The external vision service.
///
/// `perform` runs a batch of requests against one image and calls `complete` once per
/// request as results become available, in any order. Returning `Err` means the batch
/// as a whole failed; requests that were not completed by then are failed with that
/// error by the dispatcher.
pub trait FaceDetector: Send + Sync + 'static {
    fn perform(
        &self,
        image: &SourceImage,
        requests: &[DetectionRequest],
        complete: &mut dyn FnMut(Completion),
    ) -> Result<(), DetectionError>;
}
