//! Session store port
//!
//! Defines how the session state is loaded and mutated.

use crate::core::models::SessionState;
use crate::error::EnforcerError;

/// Persistent home of the single [`SessionState`]
///
/// All mutation goes through [`SessionStore::update`], which runs the
/// closure against the freshest state while holding an exclusive lock.
/// Concurrent updaters (threads or processes) are serialized; a caller that
/// cannot get the lock in time receives [`EnforcerError::LockTimeout`].
pub trait SessionStore: Send + Sync {
    /// Read a consistent snapshot of the state
    ///
    /// A missing backing file yields an empty session.
    fn load(&self) -> Result<SessionState, EnforcerError>;

    /// Apply `op` atomically
    ///
    /// The state is written back only if `op` returns `Ok`. On error the
    /// persisted state is unchanged.
    fn update<T, F>(&self, op: F) -> Result<T, EnforcerError>
    where
        F: FnOnce(&mut SessionState) -> Result<T, EnforcerError>,
        Self: Sized;
}
