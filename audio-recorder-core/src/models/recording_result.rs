use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::RecorderError;
use super::format::Format;

/// Why a recording session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    EndOfStream,
    DurationElapsed(Duration),
    Interrupted,
    StreamError {
        node: String,
        description: String,
        debug: Option<String>,
    },
    Fatal(RecorderError),
}

impl ShutdownReason {
    /// Normal stops are end-of-stream, elapsed duration and user interrupt.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::EndOfStream | Self::DurationElapsed(_) | Self::Interrupted
        )
    }

    /// Process exit status for a session that ended for this reason.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => f.write_str("end of stream"),
            Self::DurationElapsed(limit) => write!(f, "duration of {}s elapsed", limit.as_secs()),
            Self::Interrupted => f.write_str("interrupted"),
            Self::StreamError {
                node, description, ..
            } => write!(f, "error from '{}': {}", node, description),
            Self::Fatal(err) => write!(f, "fatal: {}", err),
        }
    }
}

/// Result returned when a recording session has been torn down.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub position: Option<Duration>,
    pub reason: ShutdownReason,
    pub metadata: RecordingMetadata,
}

impl RecordingResult {
    pub fn exit_code(&self) -> u8 {
        self.reason.exit_code()
    }
}

/// Metadata written as a JSON sidecar next to a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_path: String,
    pub format: Format,
    pub duration_secs: Option<f64>,
    pub stop_reason: String,
    pub checksum: Option<String>,
    pub created_at: String,
}

impl RecordingMetadata {
    pub fn new(
        file_path: &str,
        format: Format,
        position: Option<Duration>,
        reason: &ShutdownReason,
        checksum: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: file_path.to_string(),
            format,
            duration_secs: position.map(|p| p.as_secs_f64()),
            stop_reason: reason.to_string(),
            checksum,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
