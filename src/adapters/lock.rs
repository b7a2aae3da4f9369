//! Advisory file locks
//!
//! Both the session store and the audit log serialize writers through an
//! exclusive `flock` on a sibling lock file. Acquisition polls so that a
//! caller gives up with [`EnforcerError::LockTimeout`] instead of waiting
//! forever on a stuck peer.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::EnforcerError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Held exclusive lock; released on drop
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Lock file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("failed to release lock {}: {e}", self.path.display());
        }
    }
}

/// Acquire an exclusive lock on `path`, waiting at most `timeout`
pub fn acquire(path: &Path, timeout: Duration) -> Result<LockGuard, EnforcerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EnforcerError::storage(parent, e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| EnforcerError::storage(path, e))?;

    let started = Instant::now();
    loop {
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                return Ok(LockGuard {
                    file,
                    path: path.to_path_buf(),
                });
            }
            Err(e) if is_contended(&e) => {
                let waited = started.elapsed();
                if waited >= timeout {
                    let waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX);
                    log::warn!("gave up on lock {} after {waited_ms}ms", path.display());
                    return Err(EnforcerError::LockTimeout {
                        path: path.to_path_buf(),
                        waited_ms,
                    });
                }
                thread::sleep(POLL_INTERVAL.min(timeout.saturating_sub(waited)));
            }
            Err(e) => return Err(EnforcerError::storage(path, e)),
        }
    }
}

fn is_contended(e: &std::io::Error) -> bool {
    e.kind() == ErrorKind::WouldBlock || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
