use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::models::error::RecorderError;

/// Compute the SHA-256 hex digest of a finished recording.
pub fn sha256_file(path: &Path) -> Result<String, RecorderError> {
    let file = File::open(path)
        .map_err(|e| RecorderError::Storage(format!("failed to open file for checksum: {}", e)))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; 64 * 1024];
    loop {
        let read = reader
            .read(&mut chunk)
            .map_err(|e| RecorderError::Storage(format!("failed to read file for checksum: {}", e)))?;
        if read == 0 {
            break;
        }
        hasher.update(&chunk[..read]);
    }
    Ok(hex_encode(&hasher.finalize()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
