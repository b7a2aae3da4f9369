//! `SessionStore` backed by one JSON file
//!
//! Writers take the advisory lock, re-read the file, apply their change and
//! replace the file through a rename. Readers never lock: the rename means
//! they always see either the old or the new document, never a torn one.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::format::StateFile;
use crate::adapters::lock;
use crate::core::models::SessionState;
use crate::core::ports::SessionStore;
use crate::error::EnforcerError;
use crate::paths;

/// File-backed session store
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl JsonSessionStore {
    /// Store for the project rooted at `root`
    #[must_use]
    pub fn new(root: &Path, lock_timeout_ms: u64) -> Self {
        Self::at(paths::state_file(root), paths::state_lock(root), lock_timeout_ms)
    }

    /// Store at explicit state and lock paths
    #[must_use]
    pub fn at(path: PathBuf, lock_path: PathBuf, lock_timeout_ms: u64) -> Self {
        Self {
            path,
            lock_path,
            lock_timeout: Duration::from_millis(lock_timeout_ms),
        }
    }

    /// State file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the state file exists yet
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn default_project_name(&self) -> String {
        self.path
            .parent()
            .and_then(|dir| fs::canonicalize(dir).ok())
            .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "project".to_string())
    }

    fn read(&self) -> Result<SessionState, EnforcerError> {
        if !self.path.exists() {
            return Ok(SessionState::new(self.default_project_name()));
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| EnforcerError::storage(&self.path, e))?;
        if content.trim().is_empty() {
            return Ok(SessionState::new(self.default_project_name()));
        }
        let file: StateFile =
            serde_json::from_str(&content).map_err(|e| EnforcerError::storage(&self.path, e))?;
        Ok(file.into_state())
    }

    fn write(&self, state: &SessionState) -> Result<(), EnforcerError> {
        let content = serde_json::to_string_pretty(&StateFile::from_state(state))
            .map_err(|e| EnforcerError::storage(&self.path, e))?;

        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "state".into(), |n| n.to_string_lossy().to_string());
        let tmp = self.path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));

        let mut out = File::create(&tmp).map_err(|e| EnforcerError::storage(&tmp, e))?;
        out.write_all(content.as_bytes())
            .and_then(|()| out.write_all(b"\n"))
            .and_then(|()| out.sync_all())
            .map_err(|e| EnforcerError::storage(&tmp, e))?;
        drop(out);

        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            EnforcerError::storage(&self.path, e)
        })
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Result<SessionState, EnforcerError> {
        self.read()
    }

    fn update<T, F>(&self, op: F) -> Result<T, EnforcerError>
    where
        F: FnOnce(&mut SessionState) -> Result<T, EnforcerError>,
    {
        let guard = lock::acquire(&self.lock_path, self.lock_timeout)?;
        let mut state = self.read()?;
        let value = op(&mut state)?;
        state.touch();
        self.write(&state)?;
        log::debug!("wrote {} (lock {})", self.path.display(), guard.path().display());
        drop(guard);
        Ok(value)
    }
}
