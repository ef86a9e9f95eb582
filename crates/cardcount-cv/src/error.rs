use thiserror::Error;

/// Configuration errors rejected when a tracker is built or retuned
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    #[error("frame rate must be a positive finite number, got {0}")]
    InvalidFrameRate(f64),
    #[error("{name} must be a positive finite number of seconds, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },
}
