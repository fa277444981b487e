//! Face-detection overlay core.
//!
//! Detector output arrives in a normalized, bottom-left-origin unit square. This crate
//! maps it onto the pixel bounds of a displayed image and keeps the overlay layer of
//! boxes and landmark paths in step with repeated detection passes.

pub mod build_info;
pub mod config;
pub mod detection;
pub mod display;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod observation;
pub mod overlay;
pub mod session;
pub mod settings;
pub mod utils;

pub use detection::{AnalysisKind, Completion, DetectionDispatcher, DetectionRequest, FaceDetector, SourceImage};
pub use display::{DisplayContext, DisplayMessage};
pub use error::{DetectionError, Error, Result};
pub use geometry::{pixel_point, pixel_rect, NormalizedPoint, NormalizedRect, Point, Rect};
pub use observation::{FaceLandmarks, FaceObservation, LandmarkRegion, Observations};
pub use overlay::{Annotation, OverlayRenderer, OverlayStyle, OverlaySurface, SurfaceSnapshot};
pub use session::DetectionSession;
