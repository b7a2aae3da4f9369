//! Command implementations

mod audit;
mod completion;
mod init;
mod resolve;
mod session;
mod status;
mod task;
mod validate;
mod work_log;

pub use audit::audit;
pub use completion::{request_completion, requirements};
pub use init::init;
pub use resolve::resolve;
pub use session::{active, release, select};
pub use status::status;
pub use task::task;
pub use validate::validate_action;
pub use work_log::work_log;

use taskwarden::Enforcer;
use taskwarden::adapters::{JsonSessionStore, JsonlAuditLog};
use taskwarden::paths;

/// File-backed enforcer used by every command
type FileEnforcer = Enforcer<JsonSessionStore, JsonlAuditLog>;

/// Enforcer for the project containing the current directory
fn open() -> anyhow::Result<FileEnforcer> {
    let root = paths::project_root();
    log::debug!("project root: {}", root.display());
    Ok(Enforcer::open(&root)?)
}
