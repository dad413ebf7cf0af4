//! Step outcome type with factory methods.

use super::StepStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a step's work function reports back to the runner.
///
/// Context updates are deltas: the runner merges them into the shared context
/// only when the status is [`StepStatus::Succeeded`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    /// The terminal status of the step.
    pub status: StepStatus,

    /// Keys to merge into the shared context.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context_updates: HashMap<String, serde_json::Value>,

    /// Human-readable error, expected when the status is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StepOutcome {
    /// Creates a successful outcome with no context updates.
    #[must_use]
    pub fn succeeded() -> Self {
        Self::default()
    }

    /// Creates a successful outcome carrying context updates.
    #[must_use]
    pub fn succeeded_with(updates: HashMap<String, serde_json::Value>) -> Self {
        Self {
            context_updates: updates,
            ..Self::default()
        }
    }

    /// Creates a failed outcome with an error message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Failed,
            context_updates: HashMap::new(),
            error_message: Some(message.into()),
        }
    }

    /// Creates an outcome for a step that chose not to do its work.
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            status: StepStatus::Skipped,
            ..Self::default()
        }
    }

    /// Creates an outcome with an arbitrary status.
    #[must_use]
    pub fn with_status(status: impl Into<StepStatus>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    /// Adds a single context update.
    #[must_use]
    pub fn with_update(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context_updates.insert(key.into(), value);
        self
    }

    /// Sets the error message.
    #[must_use]
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Returns true if the outcome succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
