//! Temporal consolidation of card detections

pub mod config;
pub mod entity;
pub mod tracker;

pub use config::{Thresholds, TrackerConfig};
pub use entity::{CardState, TrackedCard, cards_from_detections};
pub use tracker::{CardTracker, FrameReport};
