//! The structured report produced by a pipeline run.

use crate::context::PipelineContext;
use crate::core::{PipelineStatus, StepStatus};
use crate::utils::Timestamp;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Id of the synthetic step result used to report graph-definition errors.
pub const RESOLUTION_STEP_ID: &str = "__resolve__";

/// Result of a single step within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    /// Terminal status of the step.
    pub status: StepStatus,
    /// Error message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Wall-clock duration; absent for steps that never ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl StepResult {
    /// Result of a step that ran.
    #[must_use]
    pub const fn ran(status: StepStatus, error_message: Option<String>, duration_ms: u64) -> Self {
        Self {
            status,
            error_message,
            duration_ms: Some(duration_ms),
        }
    }

    /// Result of a step that was not run because a dependency did not succeed.
    #[must_use]
    pub const fn skipped() -> Self {
        Self {
            status: StepStatus::Skipped,
            error_message: None,
            duration_ms: None,
        }
    }
}

/// The engine's single externally visible output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunResult {
    /// Id of the pipeline that ran.
    pub pipeline_id: String,
    /// Aggregate status.
    pub status: PipelineStatus,
    /// When the run started.
    pub started_at: Timestamp,
    /// When the run finished.
    pub finished_at: Timestamp,
    /// Wall-clock duration of the whole run.
    pub total_duration_ms: u64,
    /// Resolved step order; empty if resolution failed.
    #[serde(default)]
    pub execution_order: Vec<String>,
    /// Per-step results, in execution order.
    pub step_results: IndexMap<String, StepResult>,
    /// The fully merged context after the last executed step.
    pub final_context: PipelineContext,
}

impl PipelineRunResult {
    /// Returns true if the aggregate status is `succeeded`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Looks up a step result.
    #[must_use]
    pub fn step(&self, id: &str) -> Option<&StepResult> {
        self.step_results.get(id)
    }

    /// Returns the id and message of the first failed step, in execution order.
    #[must_use]
    pub fn first_failure(&self) -> Option<(&str, &str)> {
        self.step_results
            .iter()
            .find(|(_, r)| r.status.is_failure())
            .map(|(id, r)| (id.as_str(), r.error_message.as_deref().unwrap_or("")))
    }

    /// Counts the steps that ended with the given status.
    #[must_use]
    pub fn count(&self, status: &StepStatus) -> usize {
        self.step_results
            .values()
            .filter(|r| &r.status == status)
            .count()
    }
}
