use std::time::Duration;

use crate::models::error::RecorderError;
use crate::models::recording_result::{RecordingResult, ShutdownReason};
use crate::models::state::PipelineState;

/// Observer for recording session notifications.
///
/// Methods are called from whichever thread drove the change: the caller
/// of `start`, the event loop worker, or the interrupt handler.
/// Implementations must not call back into the recorder.
pub trait RecorderDelegate: Send + Sync {
    /// Called after the lifecycle accepted a state change.
    fn on_state_changed(&self, state: PipelineState);

    /// Called on every duration watchdog tick with the queried position.
    fn on_position(&self, _position: Option<Duration>) {}

    /// Called when a fatal error is detected, before teardown.
    fn on_error(&self, error: &RecorderError);

    /// Called once, by the first shutdown trigger.
    fn on_shutdown(&self, _reason: &ShutdownReason) {}

    /// Called when the recording is finalized.
    fn on_recording_finished(&self, result: &RecordingResult);
}
