//! JSON file session storage
//!
//! Implements `SessionStore` over `SESSION_STATE.json`.

mod format;
mod store;

pub use format::StateFile;
pub use store::JsonSessionStore;
