use std::path::PathBuf;
use std::time::Duration;

use super::format::Format;

/// Interval between duration checks while recording.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for a recording session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfiguration {
    /// Directory where the recording is written. Created if missing.
    pub output_directory: PathBuf,

    /// Output format (default: raw).
    pub format: Format,

    /// Stop once the playback position exceeds this (None = until EOS or interrupt).
    pub max_duration: Option<Duration>,

    /// How often the duration watchdog polls the position (default: 1s).
    pub tick_interval: Duration,

    /// Write a `.metadata.json` sidecar next to the recording when it finishes.
    pub write_metadata: bool,
}

impl RecorderConfiguration {
    pub fn new(output_directory: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            output_directory: output_directory.into(),
            format,
            ..Default::default()
        }
    }

    pub fn with_duration_secs(mut self, secs: i64) -> Self {
        self.max_duration = Self::duration_from_secs(secs);
        self
    }

    /// Non-positive durations mean "unbounded".
    pub fn duration_from_secs(secs: i64) -> Option<Duration> {
        u64::try_from(secs)
            .ok()
            .filter(|&s| s > 0)
            .map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.output_directory.as_os_str().is_empty() {
            return Err("output directory must not be empty".into());
        }
        if self.tick_interval.is_zero() {
            return Err("tick interval must be positive".into());
        }
        if self.max_duration.is_some_and(|d| d.is_zero()) {
            return Err("maximum duration must be positive".into());
        }
        Ok(())
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("tmp"),
            format: Format::Raw,
            max_duration: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
            write_metadata: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_duration_is_unbounded() {
        assert_eq!(RecorderConfiguration::duration_from_secs(-1), None);
        assert_eq!(RecorderConfiguration::duration_from_secs(0), None);
        assert_eq!(
            RecorderConfiguration::duration_from_secs(5),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn validate_rejects_zero_tick() {
        let config = RecorderConfiguration {
            tick_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(RecorderConfiguration::default().validate().is_ok());
    }
}
