//! Initialize taskwarden in a project

use std::fmt::Write;
use std::fs;
use std::path::Path;

use taskwarden::config::Config;
use taskwarden::core::ports::SessionStore;
use taskwarden::output::{OperationResult, OutputMode};
use taskwarden::{Enforcer, paths};

const CONFIG_HEADER: &str = "\
# taskwarden configuration
#
# enforcement.level: strict | moderate | permissive
# risk.*_patterns are case-insensitive regular expressions matched against action text.
# verification.commands maps an evidence category to a shell template; {evidence} is
# replaced by the quoted evidence and {command} by the evidence verbatim.
#
# Custom rules run in order; the first match decides:
# [[rules]]
# name = \"no-force-push\"
# pattern = \"git push .*--force\"
# verdict = \"reject\"
# message = \"force pushes are not allowed\"

";

/// Initialize taskwarden in the current directory
pub fn init(force: bool, mode: OutputMode) -> anyhow::Result<u8> {
    let root = Path::new(".");
    let config_path = paths::config_file(root);

    if config_path.exists() && !force {
        OperationResult::ok(format!(
            "Already initialized ({} exists). Use --force to reinitialize.",
            paths::CONFIG_FILE
        ))
        .render(mode);
        return Ok(0);
    }

    let mut created = Vec::new();
    let config = format!("{CONFIG_HEADER}{}", Config::default().to_toml()?);
    fs::write(&config_path, config)?;
    created.push(paths::CONFIG_FILE.to_string());

    let local = paths::taskwarden_dir(root);
    fs::create_dir_all(&local)?;
    fs::write(local.join(".gitignore"), "*\n")?;
    created.push(format!("{}/", paths::TASKWARDEN_DIR));

    fs::create_dir_all(paths::work_log_dir(root))?;
    created.push(format!("{}/", paths::WORK_LOG_DIR));

    let enforcer = Enforcer::open(root)?;
    if !enforcer.store().exists() {
        enforcer.store().update(|_| Ok(()))?;
        created.push(paths::STATE_FILE.to_string());
    }

    log::debug!("initialized in {}", root.display());
    let mut message = String::from("taskwarden initialized\n");
    for item in &created {
        let _ = writeln!(message, "  created {item}");
    }
    message.push_str("\nNext steps:\n");
    message.push_str("  taskwarden task add T1 \"what needs to be done\"\n");
    message.push_str("  taskwarden --as <agent> select T1");
    OperationResult::ok(message).render(mode);
    Ok(0)
}
