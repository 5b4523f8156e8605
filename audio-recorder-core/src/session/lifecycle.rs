use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::RecorderError;
use crate::models::state::{PipelineState, StateChangeOutcome};
use crate::traits::engine::MediaEngine;
use crate::traits::recorder_delegate::RecorderDelegate;

/// Pipeline lifecycle state machine.
///
/// Validates each requested transition, forwards it to the engine and
/// records the new state. Requests are serialized so a stop issued from
/// the event loop cannot interleave with a start from the caller.
/// `Async` outcomes are returned as-is: callers do not wait for them.
pub struct Lifecycle {
    state: Mutex<PipelineState>,
    delegate: Option<Arc<dyn RecorderDelegate>>,
}

impl Lifecycle {
    pub fn new(delegate: Option<Arc<dyn RecorderDelegate>>) -> Self {
        Self {
            state: Mutex::new(PipelineState::Idle),
            delegate,
        }
    }

    pub fn current(&self) -> PipelineState {
        *self.state.lock()
    }

    pub fn request<E: MediaEngine + ?Sized>(
        &self,
        engine: &E,
        target: PipelineState,
    ) -> Result<StateChangeOutcome, RecorderError> {
        let outcome = {
            let mut state = self.state.lock();
            let from = *state;
            if from == target {
                return Ok(StateChangeOutcome::Success);
            }
            if !from.can_transition_to(target) {
                return Err(RecorderError::InvalidTransition { from, to: target });
            }

            let outcome = engine.request_state(target);
            if outcome.is_failure() {
                log::error!("Unable to set the pipeline state to {}", target);
                return Err(RecorderError::StateChange { target });
            }
            *state = target;
            outcome
        };

        log::debug!("Pipeline state -> {} ({:?})", target, outcome);
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(target);
        }
        Ok(outcome)
    }
}
