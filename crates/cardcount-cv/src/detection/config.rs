//! Detection boundary configuration

use serde::{Deserialize, Serialize};

/// Filtering applied to raw detector output before it reaches the tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Detections below this confidence are treated as absent
    pub min_confidence: f64,
    /// Drop boxes with zero or negative extent
    pub reject_empty_boxes: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            reject_empty_boxes: true,
        }
    }
}

impl AdapterConfig {
    pub fn with_min_confidence(min_confidence: f64) -> Self {
        Self {
            min_confidence,
            ..Default::default()
        }
    }
}
