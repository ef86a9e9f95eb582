//! Card Counting Vision Library
//!
//! Turns the per-frame output of a card detector into tracked cards and a
//! running Hi-Lo count.

pub mod bbox;
pub mod detection;
pub mod error;
pub mod tracking;

// Re-export commonly used types
pub use bbox::{BBox, BBoxCollection, BBoxStats};
pub use detection::{AdapterConfig, Detection, DetectionAdapter, FrameRecord, RawDetection};
pub use error::TrackerError;
pub use tracking::{CardState, CardTracker, FrameReport, TrackedCard, TrackerConfig};

// Error handling for I/O-facing helpers
pub type Result<T> = anyhow::Result<T>;

/// Core traits for the tracking system
pub mod traits {
    use super::*;

    /// Anything that can feed one frame of detections to a [`CardTracker`]
    pub trait DetectionSource {
        /// Next frame's number and detections, or `None` at the end of the stream
        fn next_frame(&mut self) -> Option<(u64, Vec<Detection>)>;
    }

    /// Drain a source through the tracker, handing the tracker to `on_frame`
    /// after every frame. Returns the number of frames processed.
    pub fn run_source<S, F>(
        source: &mut S,
        tracker: &mut CardTracker,
        mut on_frame: F,
    ) -> Result<u64>
    where
        S: DetectionSource + ?Sized,
        F: FnMut(u64, &CardTracker) -> Result<()>,
    {
        let mut frames = 0;
        while let Some((frame, detections)) = source.next_frame() {
            tracker.update(&detections);
            frames += 1;
            on_frame(frame, tracker)?;
        }
        Ok(frames)
    }
}
