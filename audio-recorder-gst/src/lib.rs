//! # audio-recorder-gst
//!
//! GStreamer backend for audio-recorder.
//!
//! Provides:
//! - `factory`: node kind to element factory mapping (always available)
//! - `GstEngineError`: backend failures, convertible into `RecorderError`
//! - `GstEngine`: `MediaEngine` over a `gst::Pipeline` (feature `gstreamer`)
//!
//! ## Platform Requirements
//! - GStreamer 1.x runtime with the base, good and ugly plugin sets
//!   (alsasrc, vorbisenc, oggmux, flacenc, wavenc, lame)
//! - GStreamer development files for linking when the `gstreamer` feature is on
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use audio_recorder_core::{Format, Recorder, RecorderConfiguration};
//! use audio_recorder_gst::GstEngine;
//!
//! let engine = Arc::new(GstEngine::new("recorder")?);
//! let recorder = Recorder::new(engine, RecorderConfiguration::new("tmp", Format::Ogg))?;
//! recorder.start()?;
//! recorder.run();
//! ```

pub mod error;
pub mod factory;

#[cfg(feature = "gstreamer")]
pub mod engine;

pub use error::GstEngineError;
pub use factory::factory_name;

#[cfg(feature = "gstreamer")]
pub use engine::GstEngine;
