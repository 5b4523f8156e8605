use audio_recorder_core::models::error::RecorderError;
use thiserror::Error;

/// Failures raised by the GStreamer backend itself.
///
/// Operations of the `MediaEngine` trait report the node-level
/// `RecorderError` variants; these carry the backend detail behind them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GstEngineError {
    #[error("failed to initialise GStreamer: {0}")]
    Init(String),

    #[error("element '{factory}' for node '{node}' is unavailable: {message}")]
    Factory {
        factory: &'static str,
        node: String,
        message: String,
    },

    #[error("node '{node}' has no pad '{pad}'")]
    MissingPad { node: String, pad: String },

    #[error("pipeline has no bus")]
    NoBus,
}

impl From<GstEngineError> for RecorderError {
    fn from(err: GstEngineError) -> Self {
        RecorderError::Engine(err.to_string())
    }
}
