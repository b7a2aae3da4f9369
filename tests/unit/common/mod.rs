//! Common test utilities
//!
//! - `fixtures.rs` - Enforcer builders, filled work logs and proof packages
//! - `mocks.rs` - Port and rule implementations with scripted behavior

pub mod fixtures;
pub mod mocks;
