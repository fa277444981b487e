use std::sync::Arc;
use tokio::task::JoinHandle;

#[allow(unused_imports)]
use log::{debug, info, warn, error};

use crate::detection::{DetectionDispatcher, DetectionRequest, FaceDetector, SourceImage};
use crate::display::{self, DisplayContext, DisplayMessage, DisplaySender};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::overlay::OverlaySurface;

/// Wires a detector to a display task: one dispatcher, one surface owner.
pub struct DetectionSession<D> {
    dispatcher: DetectionDispatcher<D>,
    display_sender: DisplaySender,
    display_task: JoinHandle<OverlaySurface>,
    passes: usize,
}

impl<D: FaceDetector> DetectionSession<D> {
    /// Spawns the display task. Must be called from within a tokio runtime.
    pub fn start(detector: D, display: DisplayContext) -> Self {
        let (display_sender, receiver) = display::channel();
        let display_task = tokio::spawn(display.run(receiver));
        let dispatcher = DetectionDispatcher::new(detector, display_sender.clone());

        Self {
            dispatcher,
            display_sender,
            display_task,
            passes: 0,
        }
    }

    /// Clears the overlay, then runs one detection pass and waits until every
    /// completion for it has been handed to the display task.
    pub async fn run_pass(&mut self, image: Arc<SourceImage>, requests: Vec<DetectionRequest>) -> Result<()> {
        self.send(DisplayMessage::Clear)?;
        self.dispatcher.submit(image, requests).await?;
        self.passes += 1;

        debug!("Pass {} done, average batch time {:.2}ms", self.passes, self.dispatcher.average_batch_ms());
        Ok(())
    }

    /// Moves the surface to new image bounds. Existing annotations are dropped.
    pub fn resize(&self, bounds: Rect) -> Result<()> {
        self.send(DisplayMessage::Resize(bounds))
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Closes the channel and returns the surface once the display task has drained it.
    pub async fn finish(self) -> Result<OverlaySurface> {
        let Self { dispatcher, display_sender, display_task, passes } = self;
        drop(dispatcher);
        drop(display_sender);

        let surface = display_task.await?;
        info!("Session finished after {} pass(es) with {} annotation(s)", passes, surface.len());
        Ok(surface)
    }

    fn send(&self, message: DisplayMessage) -> Result<()> {
        self.display_sender
            .send(message)
            .map_err(|_| Error::DisplayClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{AnalysisKind, RecordedResult, ReplayDetector, ReplayFixture};
    use crate::geometry::NormalizedRect;
    use crate::observation::FaceObservation;
    use crate::overlay::OverlayRenderer;

    fn detector() -> ReplayDetector {
        let mut fixture = ReplayFixture::from_str(r#"{"image": {"width": 16, "height": 16}}"#).unwrap();
        fixture.results.insert(
            AnalysisKind::FaceRectangles,
            RecordedResult::Faces(vec![FaceObservation::new(NormalizedRect::new(0.0, 0.0, 0.5, 0.5))]),
        );
        ReplayDetector::new(fixture)
    }

    #[tokio::test]
    async fn test_repeated_passes_do_not_accumulate() {
        let display = DisplayContext::new(Rect::from_size(100.0, 100.0), OverlayRenderer::default());
        let mut session = DetectionSession::start(detector(), display);
        let image = Arc::new(SourceImage::blank(16, 16));

        for _ in 0..3 {
            session.run_pass(Arc::clone(&image), vec![DetectionRequest::face_rectangles()]).await.unwrap();
        }
        assert_eq!(session.passes(), 3);

        let surface = session.finish().await.unwrap();
        assert_eq!(surface.box_count(), 1);
        assert!(surface.annotations()[0].is_box());
    }

    #[tokio::test]
    async fn test_resize_drops_annotations() {
        let display = DisplayContext::new(Rect::from_size(100.0, 100.0), OverlayRenderer::default());
        let mut session = DetectionSession::start(detector(), display);

        session
            .run_pass(Arc::new(SourceImage::blank(16, 16)), vec![DetectionRequest::face_rectangles()])
            .await
            .unwrap();
        session.resize(Rect::from_size(40.0, 20.0)).unwrap();

        let surface = session.finish().await.unwrap();
        assert!(surface.is_empty());
        assert_eq!(surface.frame(), Rect::from_size(40.0, 20.0));
    }
}
