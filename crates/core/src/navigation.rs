//! Working-directory state
//!
//! Holds the canonical working directory used as the base for relative paths.
//! Only `cd` changes it, and a change is written to the state file before the
//! in-memory value moves, so the two never disagree after a failed write.

use crate::error::Result;
use crate::path::{CanonicalPath, normalize};
use crate::state::StateManager;

#[derive(Debug, Clone)]
pub struct Navigation {
    cwd: CanonicalPath,
    persist: Option<StateManager>,
}

impl Navigation {
    /// Start from the persisted working directory
    pub fn load(state: StateManager) -> Self {
        Self {
            cwd: state.load(),
            persist: Some(state),
        }
    }

    /// Working directory that lives only as long as this value
    pub fn in_memory(cwd: CanonicalPath) -> Self {
        Self { cwd, persist: None }
    }

    pub fn cwd(&self) -> &CanonicalPath {
        &self.cwd
    }

    /// Normalize user input against the working directory
    pub fn absolute(&self, input: &str) -> CanonicalPath {
        normalize(&self.cwd, input)
    }

    /// Persist `cwd`, then adopt it
    pub fn set_cwd(&mut self, cwd: CanonicalPath) -> Result<()> {
        if let Some(state) = &self.persist {
            state.save(&cwd)?;
        }
        self.cwd = cwd;
        Ok(())
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self::in_memory(CanonicalPath::root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_cwd_persists() {
        let temp_dir = TempDir::new().unwrap();
        let state = StateManager::with_path(temp_dir.path().join("state.json"));
        let mut nav = Navigation::load(state.clone());
        assert!(nav.cwd().is_root());

        nav.set_cwd(CanonicalPath::parse("/Docs").unwrap()).unwrap();
        assert_eq!(state.load().as_str(), "/Docs");
        assert_eq!(Navigation::load(state).cwd().as_str(), "/Docs");
    }

    #[test]
    fn test_failed_persist_keeps_old_cwd() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the state file should be makes the write fail
        let blocked = temp_dir.path().join("state.json");
        std::fs::create_dir(&blocked).unwrap();

        let mut nav = Navigation {
            cwd: CanonicalPath::parse("/Before").unwrap(),
            persist: Some(StateManager::with_path(blocked)),
        };
        assert!(nav.set_cwd(CanonicalPath::parse("/After").unwrap()).is_err());
        assert_eq!(nav.cwd().as_str(), "/Before");
    }

    #[test]
    fn test_absolute() {
        let nav = Navigation::in_memory(CanonicalPath::parse("/Projects").unwrap());
        assert_eq!(nav.absolute("Reports/q1.txt").as_str(), "/Projects/Reports/q1.txt");
        assert_eq!(nav.absolute("..").as_str(), "/");
    }
}
