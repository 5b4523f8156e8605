pub mod engine;
pub mod recorder_delegate;
