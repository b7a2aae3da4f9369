//! Proposed actions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An action an agent wants to take, with its justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Task the action claims to advance
    pub task_id: String,
    /// What the agent is about to do
    pub action: String,
    /// How the action advances the task
    pub justification: String,
    /// Caller-specific extras (tool name, target path, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl ActionRequest {
    /// Create a request without context
    #[must_use]
    pub fn new(
        task_id: impl Into<String>,
        action: impl Into<String>,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            action: action.into(),
            justification: justification.into(),
            context: None,
        }
    }

    /// Attach context
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}
