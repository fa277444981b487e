/// Replays recorded detector output
///
/// Stands in for the platform vision library: a JSON fixture records the image size
/// and, per analysis kind, the observations (or failure) the library produced.
///
/// ```json
/// {
///   "image": { "width": 200, "height": 100 },
///   "results": {
///     "face_rectangles": { "faces": [ { "bounding_box": { "x": 0.25, "y": 0.25, "width": 0.5, "height": 0.5 } } ] },
///     "face_landmarks": { "error": { "internal": "model unavailable" } }
///   }
/// }
/// ```
use std::collections::BTreeMap;
use std::path::Path;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{AnalysisKind, Completion, DetectionRequest, FaceDetector, SourceImage};
use crate::error::{DetectionError, Result};
use crate::observation::{FaceObservation, Observations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// What the library produced for one request kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordedResult {
    Faces(Vec<FaceObservation>),
    /// Results of a type other than face observations.
    Unrecognized(String),
    Error(DetectionError),
}

impl RecordedResult {
    fn to_completion(&self, kind: AnalysisKind) -> Completion {
        match self {
            RecordedResult::Faces(faces) => Completion::success(kind, Observations::Faces(faces.clone())),
            RecordedResult::Unrecognized(what) => Completion::success(kind, Observations::Unrecognized(what.clone())),
            RecordedResult::Error(e) => Completion::failure(kind, e.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFixture {
    pub image: ImageSize,
    #[serde(default)]
    pub results: BTreeMap<AnalysisKind, RecordedResult>,
    /// Fails the whole batch after the recorded results are delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_error: Option<DetectionError>,
}

impl ReplayFixture {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let fixture = Self::from_str(&content)?;
        info!("Loaded replay fixture {} ({} recorded result(s))", path.display(), fixture.results.len());
        Ok(fixture)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Blank bitmap with the recorded dimensions, for feeding the dispatcher.
    pub fn source_image(&self) -> SourceImage {
        SourceImage::blank(self.image.width, self.image.height)
    }
}

pub struct ReplayDetector {
    fixture: ReplayFixture,
}

impl ReplayDetector {
    pub fn new(fixture: ReplayFixture) -> Self {
        Self { fixture }
    }
}

impl FaceDetector for ReplayDetector {
    fn perform(
        &self,
        image: &SourceImage,
        requests: &[DetectionRequest],
        complete: &mut dyn FnMut(Completion),
    ) -> std::result::Result<(), DetectionError> {
        debug!("Replaying {} request(s) against a {}x{} image", requests.len(), image.width(), image.height());

        for request in requests {
            match self.fixture.results.get(&request.kind) {
                Some(recorded) => complete(recorded.to_completion(request.kind)),
                None => debug!("No recorded result for {}", request.kind),
            }
        }

        match &self.fixture.batch_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}
