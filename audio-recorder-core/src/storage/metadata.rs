use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::RecorderError;
use crate::models::recording_result::RecordingMetadata;

/// Path of the JSON sidecar for `recording_path`: `<file>.metadata.json`.
pub fn metadata_path(recording_path: &Path) -> PathBuf {
    let mut name = recording_path.as_os_str().to_os_string();
    name.push(".metadata.json");
    PathBuf::from(name)
}

/// Write recording metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<PathBuf, RecorderError> {
    let path = metadata_path(recording_path);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| RecorderError::Storage(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| RecorderError::Storage(format!("failed to write metadata: {}", e)))?;
    Ok(path)
}

/// Read recording metadata from a JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, RecorderError> {
    let json = fs::read_to_string(metadata_path(recording_path))
        .map_err(|e| RecorderError::Storage(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| RecorderError::Storage(format!("failed to parse metadata: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format::Format;
    use crate::models::recording_result::ShutdownReason;
    use std::time::Duration;

    #[test]
    fn sidecar_keeps_timestamped_name() {
        let path = Path::new("/rec/2024-03-09-07:05:01.ogg");
        assert_eq!(
            metadata_path(path),
            PathBuf::from("/rec/2024-03-09-07:05:01.ogg.metadata.json")
        );
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let recording = dir.path().join("2024-03-09-07:05:01.wav");
        let metadata = RecordingMetadata::new(
            &recording.to_string_lossy(),
            Format::Wav,
            Some(Duration::from_millis(6500)),
            &ShutdownReason::DurationElapsed(Duration::from_secs(6)),
            None,
        );

        let written = write_metadata(&metadata, &recording).unwrap();

        assert!(written.exists());
        assert_eq!(read_metadata(&recording).unwrap(), metadata);
    }
}
