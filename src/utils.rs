use crate::errors::{Result, StrataError};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub mod spinner;

/// Atomic file operations to prevent corruption during writes
pub mod atomic_file {
    use super::*;

    /// Write JSON data to a file atomically using a temporary file + rename strategy
    pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| StrataError::config(format!("failed to serialize data: {e}")))?;

        write_string(path, &content)
    }

    /// Write string content to a file atomically using a temporary file + rename strategy
    pub fn write_string(path: &Path, content: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, content)
            .map_err(|e| StrataError::config(format!("failed to write temporary file: {e}")))?;

        fs::rename(&temp_path, path)
            .map_err(|e| StrataError::config(format!("failed to finalize file write: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_json_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");

        atomic_file::write_json(&path, &vec!["a", "b"]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec!["a", "b"]);

        // No stray temp file left behind.
        assert!(!path.with_extension("tmp").exists());
    }
}
