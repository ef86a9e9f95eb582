//! Tracker timing configuration

use crate::Result;
use crate::error::TrackerError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_FRAME_RATE: f64 = 1.0;
pub const DEFAULT_CONFIRM_SECONDS: f64 = 3.0;
pub const DEFAULT_OCCLUSION_SECONDS: f64 = 3.0;
pub const DEFAULT_BACKGROUND_SECONDS: f64 = 30.0;

/// Timing of the tracker, expressed in seconds and converted to frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Frames per second of the detection stream
    pub frame_rate: f64,
    /// Time a new card must be seen before it counts as on the table
    pub confirm_seconds: f64,
    /// Grace period before a missing card is declared removed,
    /// or an unconfirmed one is dropped
    pub occlusion_seconds: f64,
    /// Time after which a card that never leaves is treated as part of the scene
    pub background_seconds: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            confirm_seconds: DEFAULT_CONFIRM_SECONDS,
            occlusion_seconds: DEFAULT_OCCLUSION_SECONDS,
            background_seconds: DEFAULT_BACKGROUND_SECONDS,
        }
    }
}

impl TrackerConfig {
    /// Default timing at the given frame rate
    pub fn at_fps(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), TrackerError> {
        validate_frame_rate(self.frame_rate)?;
        for (name, value) in [
            ("confirm_seconds", self.confirm_seconds),
            ("occlusion_seconds", self.occlusion_seconds),
            ("background_seconds", self.background_seconds),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TrackerError::InvalidDuration { name, value });
            }
        }
        Ok(())
    }

    /// Load and validate a JSON configuration file. Missing keys take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tracker config: {:?}", path))?;
        let config: TrackerConfig = serde_json::from_str(&text)
            .with_context(|| format!("Invalid tracker config: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn validate_frame_rate(frame_rate: f64) -> std::result::Result<(), TrackerError> {
    if frame_rate.is_finite() && frame_rate > 0.0 {
        Ok(())
    } else {
        Err(TrackerError::InvalidFrameRate(frame_rate))
    }
}

/// Frame counts derived from a [`TrackerConfig`]. Each is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub frames_to_confirm: u32,
    pub frames_occlusion: u32,
    pub frames_background: u32,
}

impl Thresholds {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            frames_to_confirm: seconds_to_frames(config.confirm_seconds, config.frame_rate),
            frames_occlusion: seconds_to_frames(config.occlusion_seconds, config.frame_rate),
            frames_background: seconds_to_frames(config.background_seconds, config.frame_rate),
        }
    }
}

fn seconds_to_frames(seconds: f64, frame_rate: f64) -> u32 {
    let frames = (seconds * frame_rate).ceil();
    if frames >= u32::MAX as f64 {
        u32::MAX
    } else {
        (frames as u32).max(1)
    }
}
