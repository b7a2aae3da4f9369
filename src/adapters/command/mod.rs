//! Shell command verifier
//!
//! Re-checks evidence by running an operator-configured command template
//! per category through `sh -c`. The command is killed when it exceeds its
//! time budget. Output is captured on reader threads so a chatty command
//! cannot deadlock on a full pipe.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use wait_timeout::ChildExt;

use crate::config::VerificationConfig;
use crate::core::ports::{VerificationOutcome, Verifier};

/// Most bytes kept from each of stdout and stderr
const OUTPUT_LIMIT_BYTES: usize = 64 * 1024;

/// Verifier that runs configured shell commands
#[derive(Debug, Clone)]
pub struct CommandVerifier {
    commands: BTreeMap<String, String>,
    timeout: Duration,
    workdir: PathBuf,
}

impl CommandVerifier {
    /// Build from the `[verification]` section, running commands in `workdir`
    #[must_use]
    pub fn new(config: &VerificationConfig, workdir: impl Into<PathBuf>) -> Self {
        Self {
            commands: config.commands.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            workdir: workdir.into(),
        }
    }

    /// Whether any category has a command
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Expand a template for one piece of evidence
    ///
    /// `{evidence}` becomes the evidence quoted for the shell; `{command}`
    /// becomes the evidence verbatim, for categories whose evidence is itself
    /// a command line.
    #[must_use]
    pub fn render(template: &str, evidence: &str) -> String {
        template.replace("{evidence}", &shell_quote(evidence)).replace("{command}", evidence)
    }
}

impl Verifier for CommandVerifier {
    fn handles(&self, category: &str) -> bool {
        self.commands.contains_key(category)
    }

    fn verify(&self, category: &str, evidence: &str) -> Result<VerificationOutcome> {
        let template = self
            .commands
            .get(category)
            .ok_or_else(|| anyhow!("no verification command for {category}"))?;
        let script = Self::render(template, evidence);
        log::debug!("verifying {category}: {script}");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&script)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn verification for {category}"))?;

        let stdout = child.stdout.take().ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child.stderr.take().ok_or_else(|| anyhow!("stderr was not piped"))?;
        let stdout_handle = thread::spawn(move || read_limited(stdout));
        let stderr_handle = thread::spawn(move || read_limited(stderr));

        let (status, timed_out) = match child.wait_timeout(self.timeout).context("wait for verification")? {
            Some(status) => (status, false),
            None => {
                log::warn!("verification of {category} exceeded {:?}, killing", self.timeout);
                child.kill().context("kill verification")?;
                (child.wait().context("wait after kill")?, true)
            }
        };

        let stdout = join(stdout_handle)?;
        let stderr = join(stderr_handle)?;
        let mut output = stdout;
        if !stderr.trim().is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&stderr);
        }

        Ok(if timed_out {
            VerificationOutcome::timed_out(format!(
                "timed out after {}s\n{output}",
                self.timeout.as_secs()
            ))
        } else if status.success() {
            VerificationOutcome::passed(output)
        } else {
            let code = status.code().map_or_else(|| "signal".to_string(), |c| c.to_string());
            VerificationOutcome::failed(format!("exit {code}\n{output}"))
        })
    }
}

fn read_limited<R: Read>(mut reader: R) -> Result<String> {
    let mut kept = Vec::new();
    let mut dropped = 0usize;
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let room = OUTPUT_LIMIT_BYTES.saturating_sub(kept.len());
        let take = n.min(room);
        kept.extend_from_slice(&chunk[..take]);
        dropped += n - take;
    }
    let mut text = String::from_utf8_lossy(&kept).into_owned();
    if dropped > 0 {
        text.push_str(&format!("\n[{dropped} bytes truncated]\n"));
    }
    Ok(text)
}

fn join(handle: thread::JoinHandle<Result<String>>) -> Result<String> {
    handle.join().map_err(|_| anyhow!("output reader thread panicked"))?
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}
