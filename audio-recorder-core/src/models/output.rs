use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::error::RecorderError;
use super::format::Format;

const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

/// Destination of a recording: an existing directory plus a timestamped
/// file name. Computed once before the graph is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    directory: PathBuf,
    file_name: String,
}

impl OutputTarget {
    /// Validate (or create) `directory` and name the file after `now`.
    ///
    /// Fails if `directory` exists but is not a directory.
    pub fn prepare(directory: &Path, format: Format, now: DateTime<Local>) -> Result<Self, RecorderError> {
        if !directory.exists() {
            fs::create_dir_all(directory).map_err(|e| {
                RecorderError::OutputTarget(format!(
                    "failed to create {}: {}",
                    directory.display(),
                    e
                ))
            })?;
            log::info!("Created output directory {}", directory.display());
        } else if !directory.is_dir() {
            return Err(RecorderError::OutputTarget(format!(
                "output location {} already exists as a file",
                directory.display()
            )));
        }

        Ok(Self {
            directory: directory.to_path_buf(),
            file_name: Self::file_name_for(format, now),
        })
    }

    pub fn file_name_for(format: Format, now: DateTime<Local>) -> String {
        format!("{}.{}", now.format(FILE_TIMESTAMP_FORMAT), format.extension())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}
