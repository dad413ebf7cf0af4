//! Test assertions for pipeline run results.

use crate::core::{PipelineStatus, StepStatus};
use crate::pipeline::PipelineRunResult;

/// Asserts that a step ended with the expected status.
pub fn assert_step_status(result: &PipelineRunResult, step: &str, expected: &StepStatus) {
    let actual = result.step(step).map(|r| &r.status);
    assert_eq!(
        actual,
        Some(expected),
        "Expected step '{}' to be {:?}, got {:?}",
        step,
        expected,
        actual
    );
}

/// Asserts that a step failed with exactly the given message.
pub fn assert_step_failed_with(result: &PipelineRunResult, step: &str, message: &str) {
    assert_step_status(result, step, &StepStatus::Failed);
    let actual = result.step(step).and_then(|r| r.error_message.as_deref());
    assert_eq!(
        actual,
        Some(message),
        "Expected step '{}' to fail with {:?}, got {:?}",
        step,
        message,
        actual
    );
}

/// Asserts the aggregate pipeline status.
pub fn assert_pipeline_status(result: &PipelineRunResult, expected: PipelineStatus) {
    assert_eq!(
        result.status, expected,
        "Expected pipeline '{}' to be {}, got {}. Steps: {:?}",
        result.pipeline_id, expected, result.status, result.step_results
    );
}
