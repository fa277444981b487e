use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

#[allow(unused_imports)]
use log::{debug, info, warn, error};

use super::{AnalysisKind, Completion, DetectionRequest, FaceDetector, SourceImage};
use crate::display::DisplayMessage;
use crate::error::DetectionError;
use crate::utils::timing::TimingStats;

/// Runs request batches on the blocking pool and hands completions to the display task.
///
/// The dispatcher keeps no results; everything it learns goes over the channel.
pub struct DetectionDispatcher<D> {
    detector: Arc<D>,
    sender: UnboundedSender<DisplayMessage>,
    stats: Arc<Mutex<TimingStats>>,
}

impl<D: FaceDetector> DetectionDispatcher<D> {
    pub fn new(detector: D, sender: UnboundedSender<DisplayMessage>) -> Self {
        Self {
            detector: Arc::new(detector),
            sender,
            stats: Arc::new(Mutex::new(TimingStats::new("Detection batch"))),
        }
    }

    /// Performs every request against `image` in one batch, off the calling context.
    ///
    /// Must be called from within a tokio runtime. The returned handle resolves once
    /// all completions for this batch have been sent.
    pub fn submit(&self, image: Arc<SourceImage>, requests: Vec<DetectionRequest>) -> JoinHandle<()> {
        let detector = Arc::clone(&self.detector);
        let sender = self.sender.clone();
        let stats = Arc::clone(&self.stats);

        debug!("Submitting {} request(s) for a {}x{} image", requests.len(), image.width(), image.height());

        tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            perform_batch(detector.as_ref(), &image, &requests, |completion| {
                if sender.send(DisplayMessage::Completion(completion)).is_err() {
                    warn!("Display task is gone, dropping detection result");
                }
            });

            // Held only while recording; batches never wait on each other
            stats
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .add_measurement(start.elapsed());
        })
    }

    pub fn average_batch_ms(&self) -> f64 {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).average_ms()
    }
}

/// Runs one batch and delivers exactly one completion per requested kind.
///
/// A zero-size image never reaches the detector. Duplicate completions for a kind are
/// dropped; kinds the detector never completed are failed with the batch error, or with
/// an internal error if the batch itself succeeded.
pub fn perform_batch<D, F>(detector: &D, image: &SourceImage, requests: &[DetectionRequest], mut deliver: F)
where
    D: FaceDetector + ?Sized,
    F: FnMut(Completion),
{
    let mut pending: Vec<AnalysisKind> = Vec::new();
    for request in requests {
        if !pending.contains(&request.kind) {
            pending.push(request.kind);
        }
    }

    let batch_result = if image.is_empty() {
        Err(DetectionError::ZeroSizeImage)
    } else {
        let mut delivered: HashSet<AnalysisKind> = HashSet::new();
        let result = detector.perform(image, requests, &mut |completion: Completion| {
            if !pending.contains(&completion.kind) {
                warn!("Ignoring completion for unrequested kind {}", completion.kind);
                return;
            }
            if !delivered.insert(completion.kind) {
                warn!("Ignoring repeated completion for {}", completion.kind);
                return;
            }
            deliver(completion);
        });
        pending.retain(|kind| !delivered.contains(kind));
        result
    };

    let fallback = match batch_result {
        Ok(()) => DetectionError::Internal("no result delivered for request".to_string()),
        Err(e) => {
            error!("Failed to perform image request: {}", e);
            e
        }
    };

    for kind in pending {
        deliver(Completion::failure(kind, fallback.clone()));
    }
}
