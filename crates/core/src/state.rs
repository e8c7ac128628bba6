//! Persisted working directory
//!
//! The working directory survives between invocations as a single JSON record,
//! `{"cwd_path": "/..."}`, next to the configuration file. A missing file means
//! the root. Unreadable or corrupt content is also treated as the root, with a
//! warning, so a damaged state file never blocks the CLI.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::path::CanonicalPath;

#[derive(Debug, Serialize, Deserialize)]
struct StateRecord {
    cwd_path: String,
}

/// Reads and writes the working-directory record
#[derive(Debug, Clone)]
pub struct StateManager {
    state_path: PathBuf,
}

impl StateManager {
    pub fn with_path(path: PathBuf) -> Self {
        Self { state_path: path }
    }

    pub fn state_path(&self) -> &PathBuf {
        &self.state_path
    }

    /// Load the stored working directory, falling back to `/`
    pub fn load(&self) -> CanonicalPath {
        if !self.state_path.exists() {
            return CanonicalPath::root();
        }

        let content = match std::fs::read_to_string(&self.state_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.state_path.display(), error = %e, "unreadable state file, resetting working directory to /");
                return CanonicalPath::root();
            }
        };

        let record: StateRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %self.state_path.display(), error = %e, "corrupt state file, resetting working directory to /");
                return CanonicalPath::root();
            }
        };

        match CanonicalPath::parse(&record.cwd_path) {
            Ok(cwd) => cwd,
            Err(e) => {
                warn!(path = %self.state_path.display(), error = %e, "invalid stored working directory, resetting to /");
                CanonicalPath::root()
            }
        }
    }

    /// Replace the stored record
    pub fn save(&self, cwd: &CanonicalPath) -> Result<()> {
        if let Some(parent) = self.state_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let record = StateRecord {
            cwd_path: cwd.to_string(),
        };
        std::fs::write(&self.state_path, serde_json::to_string_pretty(&record)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_state() -> (StateManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let manager = StateManager::with_path(temp_dir.path().join("state.json"));
        (manager, temp_dir)
    }

    #[test]
    fn test_missing_file_is_root() {
        let (manager, _temp_dir) = temp_state();
        assert!(manager.load().is_root());
    }

    #[test]
    fn test_save_and_load() {
        let (manager, _temp_dir) = temp_state();
        let cwd = CanonicalPath::parse("/Projects/Reports").unwrap();
        manager.save(&cwd).unwrap();
        assert_eq!(manager.load(), cwd);

        let raw = std::fs::read_to_string(manager.state_path()).unwrap();
        assert!(raw.contains("\"cwd_path\": \"/Projects/Reports\""));
    }

    #[test]
    fn test_corrupt_file_resets_to_root() {
        let (manager, _temp_dir) = temp_state();
        std::fs::write(manager.state_path(), "{not json").unwrap();
        assert!(manager.load().is_root());
    }

    #[test]
    fn test_non_canonical_value_resets_to_root() {
        let (manager, _temp_dir) = temp_state();
        std::fs::write(manager.state_path(), r#"{"cwd_path": "relative/dir"}"#).unwrap();
        assert!(manager.load().is_root());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let manager = StateManager::with_path(temp_dir.path().join("nested/dir/state.json"));
        manager.save(&CanonicalPath::root()).unwrap();
        assert!(manager.state_path().exists());
    }
}
