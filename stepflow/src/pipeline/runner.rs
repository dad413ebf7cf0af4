//! Sequential pipeline runner.
//!
//! Steps run one at a time in resolved order against a context the runner
//! owns exclusively. A step whose dependencies did not all succeed is skipped
//! without being invoked, which cascades through its own dependents. Sibling
//! branches keep running after a failure.

use super::result::RESOLUTION_STEP_ID;
use super::{resolve_order, PipelineDefinition, PipelineRunResult, RunOptions, StepResult, StepSpec};
use crate::context::PipelineContext;
use crate::core::{PipelineStatus, StepOutcome, StepStatus};
use crate::errors::ResolveError;
use crate::utils::{elapsed_ms, generate_run_id, now_utc, Timestamp};
use futures::FutureExt;
use indexmap::IndexMap;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Executes pipeline definitions and reports structured results.
///
/// A run never returns an error: invalid graphs, failing steps and steps that
/// raise errors or panic are all reported inside the [`PipelineRunResult`].
#[derive(Debug, Clone, Default)]
pub struct PipelineRunner {
    options: RunOptions,
}

impl PipelineRunner {
    /// Creates a runner with the given options.
    #[must_use]
    pub const fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Returns the run options.
    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Runs a pipeline against an initial context.
    pub async fn run(
        &self,
        definition: &PipelineDefinition,
        initial_context: PipelineContext,
    ) -> PipelineRunResult {
        let run_id = generate_run_id();
        let span = info_span!(
            "pipeline",
            pipeline_id = %definition.id,
            run_id = %run_id,
            dry_run = self.options.dry_run,
        );
        self.run_inner(definition, initial_context)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        definition: &PipelineDefinition,
        initial_context: PipelineContext,
    ) -> PipelineRunResult {
        let started_at = now_utc();
        let start = Instant::now();

        self.options.log(&format!(
            "Pipeline '{}' started ({} steps)",
            definition.id,
            definition.step_count()
        ));

        let order = match resolve_order(&definition.steps) {
            Ok(order) => order,
            Err(err) => {
                return self.invalid_graph(definition, initial_context, &err, started_at, start);
            }
        };

        let execution_order: Vec<String> = order.iter().map(|s| s.id.clone()).collect();
        self.options
            .log_verbose(&format!("Execution order: {}", execution_order.join(" -> ")));

        if self.options.dry_run {
            return self.dry_run(definition, initial_context, execution_order, started_at);
        }

        let mut context = initial_context;
        let mut step_results: IndexMap<String, StepResult> = IndexMap::with_capacity(order.len());

        for step in order {
            let result = match blocking_dependency(step, &step_results) {
                Some(blocker) => {
                    warn!(step = %step.id, blocked_by = %blocker, "Skipping step: dependency did not succeed");
                    self.options.log(&format!(
                        "[skipped] {} (dependency '{}' did not succeed)",
                        step.id, blocker
                    ));
                    StepResult::skipped()
                }
                None => self.execute_step(step, &mut context).await,
            };
            step_results.insert(step.id.clone(), result);
        }

        let status = aggregate_status(&step_results);
        let total_duration_ms = elapsed_ms(start);

        info!(
            status = %status,
            duration_ms = total_duration_ms,
            steps = step_results.len(),
            "Pipeline finished"
        );
        self.options.log(&format!(
            "Pipeline '{}' {} in {}ms",
            definition.id, status, total_duration_ms
        ));

        PipelineRunResult {
            pipeline_id: definition.id.clone(),
            status,
            started_at,
            finished_at: now_utc(),
            total_duration_ms,
            execution_order,
            step_results,
            final_context: context,
        }
    }

    /// Invokes a runnable step and folds its outcome into the context.
    async fn execute_step(&self, step: &StepSpec, context: &mut PipelineContext) -> StepResult {
        debug!(step = %step.id, "Step started");
        if !step.description.is_empty() {
            self.options
                .log_verbose(&format!("Running '{}': {}", step.id, step.description));
        }

        let step_start = Instant::now();
        let outcome = invoke(step, context).await;
        let duration_ms = elapsed_ms(step_start);

        let StepOutcome {
            status,
            context_updates,
            error_message,
        } = outcome;

        if status.is_success() && !context_updates.is_empty() {
            let mut keys: Vec<&str> = context_updates.keys().map(String::as_str).collect();
            keys.sort_unstable();
            self.options
                .log_verbose(&format!("  '{}' updated context: {}", step.id, keys.join(", ")));
            context.merge(context_updates);
        }

        match (&status, &error_message) {
            (StepStatus::Failed, message) => {
                warn!(step = %step.id, duration_ms, error = ?message, "Step failed");
                self.options.log(&format!(
                    "[failed] {} ({}ms): {}",
                    step.id,
                    duration_ms,
                    message.as_deref().unwrap_or("no error message")
                ));
            }
            (status, _) => {
                info!(step = %step.id, status = %status, duration_ms, "Step completed");
                self.options
                    .log(&format!("[{}] {} ({}ms)", status, step.id, duration_ms));
            }
        }

        StepResult::ran(status, error_message, duration_ms)
    }

    fn dry_run(
        &self,
        definition: &PipelineDefinition,
        initial_context: PipelineContext,
        execution_order: Vec<String>,
        started_at: Timestamp,
    ) -> PipelineRunResult {
        let step_results: IndexMap<String, StepResult> = execution_order
            .iter()
            .map(|id| {
                self.options.log(&format!("[dry-run] {id}"));
                (id.clone(), StepResult::ran(StepStatus::Succeeded, None, 0))
            })
            .collect();

        info!(steps = step_results.len(), "Dry run finished");
        self.options.log(&format!(
            "Pipeline '{}' dry run: {} steps would run",
            definition.id,
            step_results.len()
        ));

        PipelineRunResult {
            pipeline_id: definition.id.clone(),
            status: PipelineStatus::Succeeded,
            started_at,
            finished_at: now_utc(),
            total_duration_ms: 0,
            execution_order,
            step_results,
            final_context: initial_context,
        }
    }

    fn invalid_graph(
        &self,
        definition: &PipelineDefinition,
        initial_context: PipelineContext,
        err: &ResolveError,
        started_at: Timestamp,
        start: Instant,
    ) -> PipelineRunResult {
        let info = err.error_info();
        error!(
            code = %info.code,
            error = %info.summary,
            fix_hint = info.fix_hint.as_deref().unwrap_or_default(),
            context = ?info.context,
            "Pipeline definition is invalid"
        );
        self.options
            .log(&format!("Pipeline '{}' failed: {}", definition.id, info.summary));
        if let Some(hint) = &info.fix_hint {
            self.options.log(&format!("  hint: {hint}"));
        }

        let mut step_results = IndexMap::with_capacity(1);
        step_results.insert(
            RESOLUTION_STEP_ID.to_string(),
            StepResult {
                status: StepStatus::Failed,
                error_message: Some(err.to_string()),
                duration_ms: None,
            },
        );

        PipelineRunResult {
            pipeline_id: definition.id.clone(),
            status: PipelineStatus::Failed,
            started_at,
            finished_at: now_utc(),
            total_duration_ms: elapsed_ms(start),
            execution_order: Vec::new(),
            step_results,
            final_context: initial_context,
        }
    }
}

/// Runs a pipeline with the given options.
pub async fn run_pipeline(
    definition: &PipelineDefinition,
    initial_context: PipelineContext,
    options: RunOptions,
) -> PipelineRunResult {
    PipelineRunner::new(options)
        .run(definition, initial_context)
        .await
}

/// Returns the first dependency of `step` that did not succeed.
fn blocking_dependency<'a>(
    step: &'a StepSpec,
    results: &IndexMap<String, StepResult>,
) -> Option<&'a str> {
    step.depends_on
        .iter()
        .find(|dep| {
            !results
                .get(dep.as_str())
                .is_some_and(|r| r.status.is_success())
        })
        .map(String::as_str)
}

fn aggregate_status(results: &IndexMap<String, StepResult>) -> PipelineStatus {
    if results.values().any(|r| r.status.is_failure()) {
        PipelineStatus::Failed
    } else {
        PipelineStatus::Succeeded
    }
}

/// Calls the step's work, converting errors and panics into failed outcomes.
async fn invoke(step: &StepSpec, context: &PipelineContext) -> StepOutcome {
    match AssertUnwindSafe(step.work.run(context)).catch_unwind().await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => StepOutcome::failed(error_message(&err)),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(step = %step.id, panic = %message, "Step panicked");
            StepOutcome::failed(message)
        }
    }
}

fn error_message(err: &anyhow::Error) -> String {
    let message = err.to_string();
    if message.is_empty() {
        format!("{err:?}")
    } else {
        message
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "step panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::{work_fn, NoOpWork, StepWork};
    use serde_json::json;
    use std::sync::Arc;

    fn noop() -> Arc<dyn StepWork> {
        Arc::new(NoOpWork)
    }

    #[test]
    fn test_panic_message_payloads() {
        let boxed: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(boxed.as_ref()), "static str");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");

        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "step panicked");
    }

    #[test]
    fn test_error_message_uses_top_level_display() {
        let err = anyhow::anyhow!("disk full").context("writing frames");
        assert_eq!(error_message(&err), "writing frames");

        let err = anyhow::anyhow!("disk full");
        assert_eq!(error_message(&err), "disk full");
    }

    #[test]
    fn test_blocking_dependency() {
        let step = StepSpec::new("c", noop()).with_dependencies(["a", "b"]);
        let mut results = IndexMap::new();
        results.insert("a".to_string(), StepResult::ran(StepStatus::Succeeded, None, 1));
        assert_eq!(blocking_dependency(&step, &results), Some("b"));

        results.insert("b".to_string(), StepResult::skipped());
        assert_eq!(blocking_dependency(&step, &results), Some("b"));

        results.insert("b".to_string(), StepResult::ran(StepStatus::Succeeded, None, 1));
        assert_eq!(blocking_dependency(&step, &results), None);
    }

    #[test]
    fn test_aggregate_status_ignores_benign_skips() {
        let mut results = IndexMap::new();
        results.insert("a".to_string(), StepResult::ran(StepStatus::Skipped, None, 0));
        results.insert("b".to_string(), StepResult::ran(StepStatus::Other("partial".into()), None, 0));
        assert_eq!(aggregate_status(&results), PipelineStatus::Succeeded);

        results.insert("c".to_string(), StepResult::ran(StepStatus::Failed, None, 0));
        assert_eq!(aggregate_status(&results), PipelineStatus::Failed);
    }

    #[tokio::test]
    async fn test_runner_merges_only_successful_updates() {
        let definition = PipelineDefinition::new(
            "merge",
            "",
            vec![
                StepSpec::new(
                    "ok",
                    work_fn(|_| Ok(StepOutcome::succeeded().with_update("ok", json!(true)))),
                ),
                StepSpec::new(
                    "bad",
                    work_fn(|_| Ok(StepOutcome::failed("nope").with_update("bad", json!(true)))),
                ),
            ],
        );

        let result = PipelineRunner::default()
            .run(&definition, PipelineContext::new())
            .await;

        assert_eq!(result.final_context.get_bool("ok"), Some(true));
        assert!(!result.final_context.contains_key("bad"));
        assert_eq!(result.status, PipelineStatus::Failed);
    }
}
