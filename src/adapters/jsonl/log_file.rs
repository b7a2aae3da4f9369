//! Append-only audit file
//!
//! One JSON object per line. Appends take an exclusive lock so sequence
//! numbers stay gap-free across processes. The next sequence number comes
//! from the last complete line, read backwards from the end of the file.
//! A trailing line without its newline is an interrupted write: readers
//! ignore it and the next append cuts it off.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapters::lock;
use crate::core::models::AuditEvent;
use crate::core::ports::AuditSink;
use crate::error::EnforcerError;
use crate::paths;

/// Bytes read per step when scanning backwards for a line break
const TAIL_CHUNK: u64 = 4096;

/// File-backed audit sink
#[derive(Debug, Clone)]
pub struct JsonlAuditLog {
    path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl JsonlAuditLog {
    /// Audit log for the project rooted at `root`
    #[must_use]
    pub fn new(root: &Path, lock_timeout_ms: u64) -> Self {
        Self::at(paths::audit_log(root), paths::audit_lock(root), lock_timeout_ms)
    }

    /// Audit log at explicit paths
    #[must_use]
    pub fn at(path: PathBuf, lock_path: PathBuf, lock_timeout_ms: u64) -> Self {
        Self {
            path,
            lock_path,
            lock_timeout: Duration::from_millis(lock_timeout_ms),
        }
    }

    /// Log file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<AuditEvent>, EnforcerError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| EnforcerError::storage(&self.path, e))?;
        let complete = content.rfind('\n').map_or("", |end| &content[..=end]);
        complete
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    EnforcerError::storage(&self.path, format!("line {}: {e}", n + 1))
                })
            })
            .collect()
    }

    /// Sequence number of the last complete event and the length of the
    /// file up to and including its line break
    fn tail(&self, file: &mut File) -> Result<(u64, u64), EnforcerError> {
        let io_err = |e: io::Error| EnforcerError::storage(&self.path, e);
        let len = file.metadata().map_err(io_err)?.len();
        let Some(last_break) = rfind_newline(file, len).map_err(io_err)? else {
            return Ok((0, 0));
        };

        let mut end = last_break;
        loop {
            let start = rfind_newline(file, end).map_err(io_err)?.map_or(0, |at| at + 1);
            let line = read_range(file, start, end).map_err(io_err)?;
            if !line.trim().is_empty() {
                let event: AuditEvent = serde_json::from_str(&line)
                    .map_err(|e| EnforcerError::storage(&self.path, format!("last line: {e}")))?;
                return Ok((event.seq, last_break + 1));
            }
            if start == 0 {
                return Ok((0, last_break + 1));
            }
            end = start - 1;
        }
    }
}

/// Offset of the last `\n` before `before`
fn rfind_newline(file: &mut File, before: u64) -> io::Result<Option<u64>> {
    let mut end = before;
    let mut buf = Vec::new();
    while end > 0 {
        let start = end.saturating_sub(TAIL_CHUNK);
        buf.clear();
        file.seek(SeekFrom::Start(start))?;
        Read::take(&mut *file, end - start).read_to_end(&mut buf)?;
        if let Some(at) = buf.iter().rposition(|&b| b == b'\n') {
            return Ok(Some(start + at as u64));
        }
        end = start;
    }
    Ok(None)
}

fn read_range(file: &mut File, start: u64, end: u64) -> io::Result<String> {
    let mut buf = Vec::new();
    file.seek(SeekFrom::Start(start))?;
    Read::take(&mut *file, end - start).read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

impl AuditSink for JsonlAuditLog {
    fn append_all(&self, events: Vec<AuditEvent>) -> Result<Vec<AuditEvent>, EnforcerError> {
        if events.is_empty() {
            return Ok(events);
        }
        let guard = lock::acquire(&self.lock_path, self.lock_timeout)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| EnforcerError::storage(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EnforcerError::storage(&self.path, e))?;

        let (last_seq, complete) = self.tail(&mut file)?;
        let len = file.metadata().map_err(|e| EnforcerError::storage(&self.path, e))?.len();
        if complete < len {
            log::warn!(
                "dropping {} bytes of an interrupted write at the end of {}",
                len - complete,
                self.path.display()
            );
            file.set_len(complete).map_err(|e| EnforcerError::storage(&self.path, e))?;
        }

        let mut buf = String::new();
        let mut appended = Vec::with_capacity(events.len());
        for (seq, mut event) in (last_seq + 1..).zip(events) {
            event.seq = seq;
            buf.push_str(
                &serde_json::to_string(&event).map_err(|e| EnforcerError::storage(&self.path, e))?,
            );
            buf.push('\n');
            appended.push(event);
        }
        file.write_all(buf.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| EnforcerError::storage(&self.path, e))?;
        drop(guard);

        for event in &appended {
            log::debug!("audit #{} {} {} {}", event.seq, event.actor, event.action, event.decision);
        }
        Ok(appended)
    }

    fn events(&self) -> Result<Vec<AuditEvent>, EnforcerError> {
        self.read_all()
    }
}
