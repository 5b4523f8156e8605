use thiserror::Error;

use super::node::NodeKind;
use super::state::PipelineState;

/// Errors that can occur while building or driving a recording pipeline.
///
/// Every variant except `Engine` and `Storage` is fatal for the session:
/// the recorder tears the pipeline down and the process exits non-zero.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("could not create '{name}' ({kind})")]
    NodeCreation { kind: NodeKind, name: String },

    #[error("could not set property on '{node}': {message}")]
    Property { node: String, message: String },

    #[error("could not add '{name}' to the pipeline")]
    AddNode { name: String },

    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("could not link '{src}' to '{dst}'")]
    Link { src: String, dst: String },

    #[error("'{src}' and '{dst}' could not be linked")]
    PadLink { src: String, dst: String },

    #[error("unable to set the pipeline state to {target}")]
    StateChange { target: PipelineState },

    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition { from: PipelineState, to: PipelineState },

    #[error("output location error: {0}")]
    OutputTarget(String),

    #[error("configuration failed: {0}")]
    Configuration(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("engine error: {0}")]
    Engine(String),
}
