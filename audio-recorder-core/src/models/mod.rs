pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod node;
pub mod output;
pub mod recording_result;
pub mod state;
