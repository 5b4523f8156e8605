use std::sync::Arc;
use std::time::Duration;

use crate::models::error::RecorderError;
use crate::models::event::EngineEvent;
use crate::models::node::{NodeKind, NodeProperty, PadRef};
use crate::models::state::{PipelineState, StateChangeOutcome};

/// Callback invoked by the engine for every event it produces.
///
/// `PadAdded` is delivered on the engine's streaming thread and must be
/// handled before the callback returns. Bus messages may arrive on any
/// thread; the recorder forwards them to its event loop without blocking.
pub type EventCallback = Arc<dyn Fn(EngineEvent) + Send + Sync + 'static>;

/// Capability interface of the media execution engine.
///
/// The recorder only orchestrates; buffer flow, scheduling and clocking
/// belong to the engine. Nodes are addressed by their unique name.
/// Implemented by:
/// - `GstEngine` (audio-recorder-gst, `gstreamer` feature)
/// - `SimulatedEngine` (in-memory, for tests and dry runs)
pub trait MediaEngine: Send + Sync {
    /// Instantiate a node of `kind` named `name`. Not yet part of the pipeline.
    fn create_node(&self, kind: NodeKind, name: &str) -> Result<(), RecorderError>;

    /// Apply a configuration property to a created node.
    fn set_property(&self, node: &str, property: &NodeProperty) -> Result<(), RecorderError>;

    /// Add a created node to the pipeline.
    fn add_node(&self, name: &str) -> Result<(), RecorderError>;

    /// Link the static output of `src` to the input of `dst`.
    fn link_nodes(&self, src: &str, dst: &str) -> Result<(), RecorderError>;

    /// Link two specific connection points.
    ///
    /// Fails if `dst` already has an incoming link.
    fn link_pads(&self, src: &PadRef, dst: &PadRef) -> Result<(), RecorderError>;

    fn is_pad_linked(&self, pad: &PadRef) -> bool;

    /// Ask the pipeline to move to `target`. May complete asynchronously.
    fn request_state(&self, target: PipelineState) -> StateChangeOutcome;

    /// Block until the last requested state change completes and return
    /// the resulting state. No timeout.
    fn wait_for_state(&self) -> PipelineState;

    /// Current playback position, if the stream is positioned yet.
    fn query_position(&self) -> Option<Duration>;

    /// Register the receiver of pad and bus events. Called once.
    fn connect_events(&self, callback: EventCallback);

    /// Write a snapshot of the graph for debugging.
    fn dump_graph(&self, _label: &str) {}
}
