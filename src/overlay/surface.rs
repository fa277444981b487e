/// The overlay layer stacked above the displayed image
///
/// The surface owns an ordered list of annotations laid out against its frame, which
/// always equals the current image bounds. Appends go through a `SurfaceTransaction`
/// so that a whole detection pass becomes visible at once: observers (the committed
/// list and the `watch` snapshot channel) never see a half-populated pass.
use log::{debug, trace};
use serde::Serialize;
use tokio::sync::watch;

use super::annotation::Annotation;
use crate::geometry::Rect;

/// What observers see after each commit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SurfaceSnapshot {
    pub frame: Rect,
    pub revision: u64,
    pub annotations: Vec<Annotation>,
}

impl SurfaceSnapshot {
    pub fn box_count(&self) -> usize {
        self.annotations.iter().filter(|a| a.is_box()).count()
    }

    pub fn path_count(&self) -> usize {
        self.annotations.iter().filter(|a| a.is_path()).count()
    }
}

pub struct OverlaySurface {
    frame: Rect,
    annotations: Vec<Annotation>,
    revision: u64,
    publisher: watch::Sender<SurfaceSnapshot>,
}

impl OverlaySurface {
    pub fn new(frame: Rect) -> Self {
        let (publisher, _) = watch::channel(SurfaceSnapshot {
            frame,
            revision: 0,
            annotations: Vec::new(),
        });

        Self {
            frame,
            annotations: Vec::new(),
            revision: 0,
            publisher,
        }
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Moves the surface onto new image bounds.
    ///
    /// Existing annotations were laid out against the old bounds, so a frame change
    /// drops them; the next detection pass repopulates the surface.
    pub fn set_frame(&mut self, frame: Rect) {
        if frame == self.frame {
            return;
        }

        debug!("Overlay frame {:?} -> {:?}, dropping {} annotation(s)", self.frame, frame, self.annotations.len());
        self.frame = frame;
        self.annotations.clear();
        self.publish();
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn box_count(&self) -> usize {
        self.annotations.iter().filter(|a| a.is_box()).count()
    }

    pub fn path_count(&self) -> usize {
        self.annotations.iter().filter(|a| a.is_path()).count()
    }

    /// Number of visible changes so far; bumps once per non-empty commit, clear or resize.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            frame: self.frame,
            revision: self.revision,
            annotations: self.annotations.clone(),
        }
    }

    /// Receives a fresh snapshot after every visible change.
    pub fn subscribe(&self) -> watch::Receiver<SurfaceSnapshot> {
        self.publisher.subscribe()
    }

    /// Starts staging annotations; nothing is visible until `commit`.
    pub fn begin(&mut self) -> SurfaceTransaction<'_> {
        SurfaceTransaction {
            surface: self,
            staged: Vec::new(),
            committed: false,
        }
    }

    /// Removes every annotation. Clearing an empty surface changes nothing.
    pub fn clear(&mut self) {
        if self.annotations.is_empty() {
            return;
        }

        debug!("Clearing {} overlay annotation(s)", self.annotations.len());
        self.annotations.clear();
        self.publish();
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = self.snapshot();
        self.publisher.send_replace(snapshot);
    }
}

/// A batch of annotations waiting to be appended in one visible step.
///
/// Dropping the transaction without committing discards what was staged.
pub struct SurfaceTransaction<'a> {
    surface: &'a mut OverlaySurface,
    staged: Vec<Annotation>,
    committed: bool,
}

impl SurfaceTransaction<'_> {
    pub fn push(&mut self, annotation: Annotation) {
        self.staged.push(annotation);
    }

    pub fn staged(&self) -> usize {
        self.staged.len()
    }

    /// Frame of the surface being populated.
    pub fn frame(&self) -> Rect {
        self.surface.frame
    }

    /// Appends everything staged and publishes one snapshot. Returns the number appended.
    pub fn commit(mut self) -> usize {
        self.committed = true;
        let count = self.staged.len();
        if count == 0 {
            return 0;
        }

        self.surface.annotations.append(&mut self.staged);
        self.surface.publish();
        trace!("Committed {} annotation(s), revision {}", count, self.surface.revision);
        count
    }
}

impl Drop for SurfaceTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.staged.is_empty() {
            debug!("Discarding {} uncommitted annotation(s)", self.staged.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::annotation::{BoxAnnotation, Color, Stroke};

    fn box_at(x: f32) -> Annotation {
        Annotation::Box(BoxAnnotation {
            frame: Rect::new(x, 0.0, 10.0, 10.0),
            border: Stroke::new(Color::BLUE, 1.0),
            fill: Color::TRANSPARENT,
            label: None,
        })
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut surface = OverlaySurface::new(Rect::from_size(100.0, 100.0));
        let mut tx = surface.begin();
        tx.push(box_at(0.0));
        tx.push(box_at(20.0));
        tx.commit();
        assert_eq!(surface.len(), 2);

        surface.clear();
        assert!(surface.is_empty());
        surface.clear();
        assert!(surface.is_empty());
    }

    #[test]
    fn test_staged_annotations_invisible_until_commit() {
        let mut surface = OverlaySurface::new(Rect::from_size(100.0, 100.0));
        let receiver = surface.subscribe();

        let mut tx = surface.begin();
        for i in 0..5 {
            tx.push(box_at(i as f32));
        }
        assert_eq!(tx.staged(), 5);
        assert!(!receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow().annotations.len(), 0);

        assert_eq!(tx.commit(), 5);
        assert_eq!(surface.len(), 5);
        assert_eq!(surface.revision(), 1);
        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow().annotations.len(), 5);
    }

    #[test]
    fn test_dropped_transaction_discards() {
        let mut surface = OverlaySurface::new(Rect::from_size(100.0, 100.0));
        {
            let mut tx = surface.begin();
            tx.push(box_at(0.0));
        }
        assert!(surface.is_empty());
        assert_eq!(surface.revision(), 0);
    }

    #[test]
    fn test_empty_commit_is_not_a_revision() {
        let mut surface = OverlaySurface::new(Rect::from_size(100.0, 100.0));
        assert_eq!(surface.begin().commit(), 0);
        assert_eq!(surface.revision(), 0);
    }

    #[test]
    fn test_resize_drops_annotations() {
        let mut surface = OverlaySurface::new(Rect::from_size(100.0, 100.0));
        let mut tx = surface.begin();
        tx.push(box_at(0.0));
        tx.commit();

        surface.set_frame(Rect::from_size(100.0, 100.0));
        assert_eq!(surface.len(), 1);

        surface.set_frame(Rect::from_size(50.0, 50.0));
        assert!(surface.is_empty());
        assert_eq!(surface.frame(), Rect::from_size(50.0, 50.0));
        assert_eq!(surface.snapshot().frame, Rect::from_size(50.0, 50.0));
    }
}
