use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline lifecycle state.
///
/// State transitions:
/// ```text
/// idle → prepared → running
///   ↓        ↓         ↓
///   └────────┴──→ stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Prepared,
    Running,
    Stopped,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Whether a request to move from `self` to `target` is allowed.
    ///
    /// Requests for the current state are accepted and treated as no-ops.
    pub fn can_transition_to(&self, target: PipelineState) -> bool {
        match (self, target) {
            (from, to) if *from == to => true,
            (Self::Idle, Self::Prepared) => true,
            (Self::Prepared, Self::Running) => true,
            (from, Self::Stopped) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Prepared => "prepared",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Result of asking the engine for a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeOutcome {
    /// The change completed synchronously.
    Success,
    /// The change continues in the background; the engine confirms later.
    Async,
    /// The change succeeded but the pipeline is live and cannot preroll.
    NoPreroll,
    Failure,
}

impl StateChangeOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure)
    }
}
