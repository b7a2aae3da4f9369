//! Justification checks
//!
//! A justification must be non-empty, long enough, and share vocabulary with
//! the task it claims to advance. The overlap test is a lexical heuristic:
//! it catches off-topic justifications, it does not prove relevance.

use std::collections::BTreeSet;

use crate::config::JustificationConfig;

/// Words too common to count as overlap
const STOPWORDS: &[&str] = &[
    "about", "after", "also", "because", "been", "before", "being", "does", "done", "each",
    "from", "have", "here", "into", "just", "make", "more", "need", "needs", "only", "other",
    "over", "should", "some", "such", "task", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "until", "using", "very", "were", "what",
    "when", "where", "which", "while", "will", "with", "work", "would", "your",
];

/// Shortest shared prefix that counts as the same word ("parser" / "parsers")
const MIN_STEM: usize = 5;

/// Significant lowercase tokens of `text`
///
/// Splits on anything that is not alphanumeric and drops tokens of three
/// characters or fewer and stopwords.
#[must_use]
pub fn keywords(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 3 && !STOPWORDS.contains(token))
        .map(String::from)
        .collect()
}

fn same_word(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short.chars().count() >= MIN_STEM && long.starts_with(short)
}

/// Task keywords the justification mentions
#[must_use]
pub fn shared_keywords(justification: &str, subject: &str) -> Vec<String> {
    let said = keywords(justification);
    keywords(subject)
        .into_iter()
        .filter(|kw| said.iter().any(|w| same_word(w, kw)))
        .collect()
}

/// Check a justification against a task subject
///
/// Returns the shared keywords on success, or the rejection reason.
/// A task whose subject has no keywords cannot demand more overlap than it
/// offers, so the required overlap is capped at the task's keyword count.
pub fn check(
    justification: &str,
    subject: &str,
    config: &JustificationConfig,
) -> Result<Vec<String>, String> {
    let trimmed = justification.trim();
    if trimmed.is_empty() {
        return Err("justification is empty; explain how this action advances the task".to_string());
    }

    let length = trimmed.chars().count();
    if length < config.min_length {
        return Err(format!(
            "justification is too short: {length} characters; at least {} required",
            config.min_length
        ));
    }

    let offered = keywords(subject).len();
    let required = config.min_keyword_overlap.min(offered);
    let shared = shared_keywords(trimmed, subject);
    if shared.len() < required {
        let wanted: Vec<String> = keywords(subject).into_iter().collect();
        return Err(format!(
            "justification does not connect to the task: shares {} of {required} required \
             keywords (task keywords: {})",
            shared.len(),
            wanted.join(", ")
        ));
    }

    Ok(shared)
}
