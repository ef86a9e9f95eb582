//! Detector output boundary

pub mod adapter;
pub mod config;
pub mod recording;

pub use adapter::{ClassRef, Detection, DetectionAdapter, RawDetection};
pub use config::AdapterConfig;
pub use recording::{FrameRecord, ReplaySource, read_frames, write_frames};
