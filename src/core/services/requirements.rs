//! Completion requirement lookup
//!
//! Required evidence categories come from, in order: an exact task-id entry
//! in the session's validation requirements, the longest matching glob
//! pattern entry, or the configured defaults for the task's tier.

use std::collections::BTreeMap;

use glob::Pattern;

use crate::config::TierDefaults;
use crate::core::models::{CompletionRequirements, RequirementSource, RiskTier, Task};

/// Resolve the required categories and where they came from
#[must_use]
pub fn resolve(
    task: &Task,
    tier: RiskTier,
    requirements: &BTreeMap<String, Vec<String>>,
    defaults: &TierDefaults,
) -> (Vec<String>, RequirementSource) {
    if let Some(categories) = requirements.get(&task.id) {
        return (categories.clone(), RequirementSource::Task);
    }

    let best = requirements
        .iter()
        .filter(|(key, _)| match Pattern::new(key) {
            Ok(pattern) => pattern.matches(&task.id),
            Err(e) => {
                log::warn!("ignoring invalid requirement pattern '{key}': {e}");
                false
            }
        })
        .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)));

    match best {
        Some((key, categories)) => (categories.clone(), RequirementSource::Pattern(key.clone())),
        None => (defaults.for_tier(tier).to_vec(), RequirementSource::TierDefault),
    }
}

/// Commands that would produce useful evidence for a task
#[must_use]
pub fn suggested_commands(task: &Task) -> Vec<String> {
    let subject = task.subject().to_lowercase();
    let mut commands = vec!["git status --porcelain  # list changed files".to_string()];

    if subject.contains("test") {
        commands.push("run the project test suite and keep its output".to_string());
    }
    if subject.contains("docker") {
        commands.push("docker compose config --quiet  # validate compose files".to_string());
    }
    if subject.contains("kubernetes") || subject.contains("k8s") {
        commands.push(
            "kubectl apply --dry-run=client --validate=true -f k8s/  # validate manifests"
                .to_string(),
        );
    }
    commands.push("grep -riE 'error|panic|traceback' <log file>  # error check".to_string());
    commands
}

/// Full requirements for a task of the given tier
#[must_use]
pub fn completion_requirements(
    task: &Task,
    tier: RiskTier,
    requirements: &BTreeMap<String, Vec<String>>,
    defaults: &TierDefaults,
) -> CompletionRequirements {
    let (categories, source) = resolve(task, tier, requirements, defaults);
    CompletionRequirements {
        task_id: task.id.clone(),
        tier,
        categories,
        source,
        suggested_commands: suggested_commands(task),
    }
}
