/// The display context
///
/// A single task owns the overlay surface and the image bounds. Background work talks
/// to it only through `DisplayMessage`s, so the surface is never touched from two
/// contexts and needs no lock.
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[allow(unused_imports)]
use log::{debug, info, warn, error};

use crate::detection::{AnalysisKind, Completion};
use crate::error::DetectionError;
use crate::geometry::Rect;
use crate::observation::Observations;
use crate::overlay::{OverlayRenderer, OverlaySurface};

#[derive(Debug)]
pub enum DisplayMessage {
    /// A request finished on the worker side.
    Completion(Completion),
    /// Drop every annotation, typically right before a new pass is submitted.
    Clear,
    /// The image is now displayed at new bounds.
    Resize(Rect),
}

pub type DisplaySender = UnboundedSender<DisplayMessage>;
pub type DisplayReceiver = UnboundedReceiver<DisplayMessage>;

pub fn channel() -> (DisplaySender, DisplayReceiver) {
    mpsc::unbounded_channel()
}

/// Called on the display context for each failed request.
pub type ErrorHandler = Box<dyn FnMut(AnalysisKind, &DetectionError) + Send>;

pub struct DisplayContext {
    image_bounds: Rect,
    surface: OverlaySurface,
    renderer: OverlayRenderer,
    on_error: ErrorHandler,
}

impl DisplayContext {
    /// Creates the surface sized to `image_bounds`.
    pub fn new(image_bounds: Rect, renderer: OverlayRenderer) -> Self {
        Self {
            image_bounds,
            surface: OverlaySurface::new(image_bounds),
            renderer,
            on_error: Box::new(|kind: AnalysisKind, e: &DetectionError| warn!("No error handler installed; {} failed: {}", kind, e)),
        }
    }

    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(AnalysisKind, &DetectionError) + Send + 'static,
    {
        self.on_error = Box::new(handler);
        self
    }

    pub fn image_bounds(&self) -> Rect {
        self.image_bounds
    }

    pub fn surface(&self) -> &OverlaySurface {
        &self.surface
    }

    pub fn handle(&mut self, message: DisplayMessage) {
        match message {
            DisplayMessage::Completion(completion) => self.handle_completion(completion),
            DisplayMessage::Clear => self.renderer.clear(&mut self.surface),
            DisplayMessage::Resize(bounds) => {
                self.image_bounds = bounds;
                self.surface.set_frame(bounds);
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        let Completion { kind, result } = completion;

        match result {
            Ok(Observations::Faces(faces)) => {
                debug!("{} completed with {} face(s) on {:?}", kind, faces.len(), self.image_bounds);
                match kind {
                    AnalysisKind::FaceRectangles => {
                        self.renderer.render_face_boxes(&faces, self.image_bounds, &mut self.surface);
                    }
                    AnalysisKind::FaceLandmarks => {
                        self.renderer.render_landmark_paths(&faces, self.image_bounds, &mut self.surface);
                    }
                }
            }
            Ok(Observations::Unrecognized(description)) => {
                contract_violation(&format!("Invalid result type for {}: {}", kind, description));
            }
            Err(e) => {
                error!("{} request failed: {}", kind, e);
                (self.on_error)(kind, &e);
            }
        }
    }

    /// Processes messages until every sender is gone, then hands the surface back.
    pub async fn run(mut self, mut receiver: DisplayReceiver) -> OverlaySurface {
        while let Some(message) = receiver.recv().await {
            self.handle(message);
        }

        debug!("Display channel closed with {} annotation(s) on the surface", self.surface.len());
        self.surface
    }
}

/// The collaborator broke its contract. Fatal in debug builds, logged and ignored otherwise.
fn contract_violation(message: &str) {
    error!("{}", message);
    debug_assert!(false, "{}", message);
}
