//! Completion requirements and requests

use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow};
use taskwarden::Caller;
use taskwarden::core::models::ProofPackage;
use taskwarden::output::{OperationResult, OutputMode, RequirementsReport, ValidationReport};

/// Show requirements for a task, or set them for a task id or pattern
pub fn requirements(
    key: &str,
    set: Vec<String>,
    clear: bool,
    caller: &Caller,
    mode: OutputMode,
) -> anyhow::Result<u8> {
    let enforcer = super::open()?;
    if clear || !set.is_empty() {
        let categories: Vec<String> =
            set.into_iter().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect();
        let message = if categories.is_empty() {
            format!("Cleared requirements for {key}")
        } else {
            format!("{key} now requires {}", categories.join(", "))
        };
        enforcer.set_requirements(caller, key, categories)?;
        OperationResult::ok(message).render(mode);
        return Ok(0);
    }

    RequirementsReport {
        requirements: enforcer.completion_requirements(key)?,
    }
    .render(mode);
    Ok(0)
}

/// Request completion and exit with the decision's code
pub fn request_completion(
    id: &str,
    proof_file: Option<&Path>,
    evidence: &[String],
    caller: &Caller,
    mode: OutputMode,
) -> anyhow::Result<u8> {
    let proof = build_proof(proof_file, evidence)?;
    let enforcer = super::open()?;
    let report =
        ValidationReport::new("request_completion", enforcer.request_completion(caller, id, &proof)?);
    report.render(mode);
    Ok(report.exit_code())
}

/// Merge a proof file with `category=evidence` pairs; pairs win
fn build_proof(proof_file: Option<&Path>, evidence: &[String]) -> anyhow::Result<ProofPackage> {
    let mut proof = match proof_file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read proof file {}", path.display()))?;
            serde_json::from_str::<ProofPackage>(&content)
                .with_context(|| format!("{} must map category names to strings", path.display()))?
        }
        None => ProofPackage::new(),
    };
    for pair in evidence {
        let (category, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("evidence must look like category=evidence, got '{pair}'"))?;
        proof = proof.with(category.trim(), value);
    }
    Ok(proof)
}
