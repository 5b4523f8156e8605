//! # audio-recorder-core
//!
//! Engine-agnostic audio recorder core.
//!
//! Builds the capture graph for the selected output format, completes the
//! decoder's dynamic link, drives the pipeline lifecycle and funnels every
//! stop trigger (end-of-stream, runtime error, elapsed duration, interrupt)
//! into one idempotent teardown. Media engines (GStreamer, the in-memory
//! simulator) implement the `MediaEngine` trait and plug into `Recorder`.
//!
//! ## Architecture
//!
//! ```text
//! audio-recorder-core (this crate)
//! ├── traits/       ← MediaEngine, RecorderDelegate
//! ├── models/       ← RecorderError, PipelineState, Format, NodeKind, OutputTarget, events
//! ├── graph/        ← NodeRegistry, GraphPlan + GraphAssembler, PadLinker
//! ├── session/      ← Lifecycle, EventDispatcher, DurationWatchdog, ShutdownCoordinator,
//! │                   EventLoop, Recorder
//! ├── storage/      ← checksum, metadata sidecar
//! └── simulated     ← SimulatedEngine
//! ```

pub mod graph;
pub mod models;
pub mod session;
pub mod simulated;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use graph::assembler::{GraphAssembler, GraphPlan, PendingLink};
pub use graph::linker::{PadLinkOutcome, PadLinker};
pub use graph::registry::NodeRegistry;
pub use models::config::RecorderConfiguration;
pub use models::error::RecorderError;
pub use models::event::{BusMessage, EngineEvent, MessageKind};
pub use models::format::Format;
pub use models::node::{NodeKind, NodeProperty, NodeSpec, PadRef};
pub use models::output::OutputTarget;
pub use models::recording_result::{RecordingMetadata, RecordingResult, ShutdownReason};
pub use models::state::{PipelineState, StateChangeOutcome};
pub use session::event_loop::Continuation;
pub use session::recorder::Recorder;
pub use session::shutdown::ShutdownCoordinator;
pub use simulated::SimulatedEngine;
pub use traits::engine::{EventCallback, MediaEngine};
pub use traits::recorder_delegate::RecorderDelegate;
