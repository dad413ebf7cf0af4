//! End-to-end tests for resolving and running pipelines.

#[cfg(test)]
mod tests {
    use crate::context::PipelineContext;
    use crate::core::{PipelineStatus, StepOutcome, StepStatus};
    use crate::events::CollectingLogSink;
    use crate::pipeline::{
        run_pipeline, PipelineBuilder, PipelineDefinition, PipelineRunner, RunOptions, StepSpec,
        RESOLUTION_STEP_ID,
    };
    use crate::steps::{async_work_fn, work_fn, NoOpWork, StepWork};
    use crate::testing::{
        assert_pipeline_status, assert_step_failed_with, assert_step_status, AddToCounterWork,
        CountingWork, ErroringWork, FailingWork, PanickingWork, SetValueWork, SlowWork,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn noop() -> Arc<dyn StepWork> {
        Arc::new(NoOpWork)
    }

    async fn run(definition: &PipelineDefinition) -> crate::pipeline::PipelineRunResult {
        run_pipeline(definition, PipelineContext::new(), RunOptions::new()).await
    }

    #[tokio::test]
    async fn test_context_threads_through_steps() {
        let definition = PipelineBuilder::new("counter")
            .then("one", "", Arc::new(AddToCounterWork::new("counter", 1)))
            .then("ten", "", Arc::new(AddToCounterWork::new("counter", 10)))
            .then("hundred", "", Arc::new(AddToCounterWork::new("counter", 100)))
            .build()
            .unwrap();

        let result = run(&definition).await;

        assert_pipeline_status(&result, PipelineStatus::Succeeded);
        assert_eq!(result.final_context.get_i64("counter"), Some(111));
        assert_eq!(result.execution_order, vec!["one", "ten", "hundred"]);
    }

    #[tokio::test]
    async fn test_later_steps_see_earlier_updates() {
        let third = Arc::new(AddToCounterWork::new("counter", 100));
        let definition = PipelineBuilder::new("counter")
            .then("one", "", Arc::new(AddToCounterWork::new("counter", 1)))
            .then("ten", "", Arc::new(AddToCounterWork::new("counter", 10)))
            .then("hundred", "", third.clone())
            .build()
            .unwrap();

        run(&definition).await;
        assert_eq!(third.seen(), vec![11]);
    }

    #[tokio::test]
    async fn test_failure_cascades_to_dependents() {
        let downstream = Arc::new(CountingWork::new());
        let definition = PipelineBuilder::new("cascade")
            .then("a", "", noop())
            .then("b", "", Arc::new(FailingWork::new("Intentional failure")))
            .then("c", "", downstream.clone())
            .then("d", "", noop())
            .build()
            .unwrap();

        let result = run(&definition).await;

        assert_pipeline_status(&result, PipelineStatus::Failed);
        assert_step_status(&result, "a", &StepStatus::Succeeded);
        assert_step_failed_with(&result, "b", "Intentional failure");
        assert_step_status(&result, "c", &StepStatus::Skipped);
        assert_step_status(&result, "d", &StepStatus::Skipped);
        assert_eq!(downstream.call_count(), 0);
        assert_eq!(result.step("c").unwrap().duration_ms, None);
        assert_eq!(result.first_failure(), Some(("b", "Intentional failure")));
    }

    #[tokio::test]
    async fn test_sibling_branch_keeps_running() {
        let sibling = Arc::new(CountingWork::new());
        let definition = PipelineBuilder::new("branches")
            .step("root", "", &[], noop())
            .step("broken", "", &["root"], Arc::new(FailingWork::new("bad branch")))
            .step("after_broken", "", &["broken"], noop())
            .step("healthy", "", &["root"], sibling.clone())
            .step("join", "", &["after_broken", "healthy"], noop())
            .build()
            .unwrap();

        let result = run(&definition).await;

        assert_eq!(sibling.call_count(), 1);
        assert_step_status(&result, "healthy", &StepStatus::Succeeded);
        assert_step_status(&result, "after_broken", &StepStatus::Skipped);
        assert_step_status(&result, "join", &StepStatus::Skipped);
        assert_eq!(result.count(&StepStatus::Skipped), 2);
    }

    #[tokio::test]
    async fn test_error_becomes_failed_step() {
        let definition = PipelineBuilder::new("errors")
            .then("explode", "", Arc::new(ErroringWork::new("Unexpected error")))
            .then("after", "", noop())
            .build()
            .unwrap();

        let result = run(&definition).await;

        assert_step_failed_with(&result, "explode", "Unexpected error");
        assert_step_status(&result, "after", &StepStatus::Skipped);
        assert_pipeline_status(&result, PipelineStatus::Failed);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let definition = PipelineDefinition::new(
            "panics",
            "",
            vec![
                StepSpec::new("boom", Arc::new(PanickingWork::new("worker blew up"))),
                StepSpec::new("independent", Arc::new(SetValueWork::new("ok", json!(true)))),
            ],
        );

        let result = run(&definition).await;

        assert_step_failed_with(&result, "boom", "worker blew up");
        assert_step_status(&result, "independent", &StepStatus::Succeeded);
        assert_eq!(result.final_context.get_bool("ok"), Some(true));
    }

    #[tokio::test]
    async fn test_dry_run_invokes_nothing() {
        let first = Arc::new(CountingWork::new());
        let second = Arc::new(CountingWork::new());
        let definition = PipelineBuilder::new("dry")
            .then("first", "", first.clone())
            .then("second", "", second.clone())
            .then("third", "", Arc::new(FailingWork::new("never called")))
            .build()
            .unwrap();

        let initial = PipelineContext::new().with("seed", json!(7));
        let result = run_pipeline(
            &definition,
            initial.clone(),
            RunOptions::new().with_dry_run(true),
        )
        .await;

        assert_eq!(first.call_count(), 0);
        assert_eq!(second.call_count(), 0);
        assert_pipeline_status(&result, PipelineStatus::Succeeded);
        assert_eq!(result.count(&StepStatus::Succeeded), 3);
        assert!(result.step_results.values().all(|r| r.duration_ms == Some(0)));
        assert_eq!(result.total_duration_ms, 0);
        assert_eq!(result.final_context, initial);
    }

    #[tokio::test]
    async fn test_dry_run_still_rejects_invalid_graph() {
        let work = Arc::new(CountingWork::new());
        let definition = PipelineDefinition::new(
            "dry-cycle",
            "",
            vec![
                StepSpec::new("a", work.clone()).with_dependency("b"),
                StepSpec::new("b", work.clone()).with_dependency("a"),
            ],
        );

        let result = run_pipeline(
            &definition,
            PipelineContext::new(),
            RunOptions::new().with_dry_run(true),
        )
        .await;

        assert_eq!(work.call_count(), 0);
        assert_pipeline_status(&result, PipelineStatus::Failed);
        assert_step_status(&result, RESOLUTION_STEP_ID, &StepStatus::Failed);
        assert!(result.execution_order.is_empty());
    }

    #[tokio::test]
    async fn test_timing_is_recorded() {
        let definition = PipelineBuilder::new("slow")
            .then("sleepy", "", Arc::new(SlowWork::with_delay_ms(60)))
            .build()
            .unwrap();

        let result = run(&definition).await;

        assert!(result.step("sleepy").unwrap().duration_ms.unwrap() >= 50);
        assert!(result.total_duration_ms >= 50);
        assert!(result.finished_at >= result.started_at);
    }

    #[tokio::test]
    async fn test_initial_context_preserved() {
        let definition = PipelineBuilder::new("keep")
            .then("other", "", Arc::new(SetValueWork::new("other", json!(1))))
            .build()
            .unwrap();

        let result = run_pipeline(
            &definition,
            PipelineContext::new().with("initialValue", json!("hello")),
            RunOptions::new(),
        )
        .await;

        assert_eq!(result.final_context.get_str("initialValue"), Some("hello"));
        assert_eq!(result.final_context.get_i64("other"), Some(1));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let definition = PipelineBuilder::new("overwrite")
            .then("first", "", Arc::new(SetValueWork::new("mode", json!("draft"))))
            .then("second", "", Arc::new(SetValueWork::new("mode", json!("final"))))
            .build()
            .unwrap();

        let result = run_pipeline(
            &definition,
            PipelineContext::new().with("mode", json!("initial")),
            RunOptions::new(),
        )
        .await;

        assert_eq!(result.final_context.get_str("mode"), Some("final"));
    }

    #[tokio::test]
    async fn test_invalid_graph_reported_as_result() {
        let work = Arc::new(CountingWork::new());
        let definition = PipelineDefinition::new(
            "cyclic",
            "",
            vec![
                StepSpec::new("a", work.clone()).with_dependency("b"),
                StepSpec::new("b", work.clone()).with_dependency("a"),
            ],
        );
        let initial = PipelineContext::new().with("untouched", json!(true));

        let result = run_pipeline(&definition, initial.clone(), RunOptions::new()).await;

        assert_eq!(work.call_count(), 0);
        assert_pipeline_status(&result, PipelineStatus::Failed);
        assert!(result.execution_order.is_empty());
        assert_eq!(result.step_results.len(), 1);
        let report = result.step(RESOLUTION_STEP_ID).unwrap();
        assert_eq!(report.status, StepStatus::Failed);
        assert!(report
            .error_message
            .as_deref()
            .unwrap()
            .contains("Circular dependency"));
        assert_eq!(result.final_context, initial);
    }

    #[tokio::test]
    async fn test_unknown_dependency_reported_as_result() {
        let definition = PipelineBuilder::new("missing")
            .step("a", "", &["ghost"], noop())
            .build_unchecked();

        let result = run(&definition).await;

        assert_step_failed_with(
            &result,
            RESOLUTION_STEP_ID,
            "Step 'a' references unknown step 'ghost'",
        );
    }

    #[tokio::test]
    async fn test_self_dependency_and_duplicates_rejected() {
        let looped = PipelineDefinition::new(
            "self",
            "",
            vec![StepSpec::new("a", noop()).with_dependency("a")],
        );
        let result = run(&looped).await;
        let message = result.first_failure().map(|(_, m)| m.to_string());
        assert_eq!(result.first_failure().map(|(id, _)| id), Some(RESOLUTION_STEP_ID));
        assert!(message.unwrap().contains("Circular dependency"));

        let duplicated = PipelineDefinition::new(
            "dupes",
            "",
            vec![StepSpec::new("a", noop()), StepSpec::new("a", noop())],
        );
        let result = run(&duplicated).await;
        assert_pipeline_status(&result, PipelineStatus::Failed);
        assert!(result.step(RESOLUTION_STEP_ID).is_some());
    }

    #[tokio::test]
    async fn test_custom_status_blocks_dependents_only() {
        let definition = PipelineBuilder::new("custom")
            .then(
                "partial",
                "",
                work_fn(|_| Ok(StepOutcome::with_status("partial"))),
            )
            .then("next", "", noop())
            .build()
            .unwrap();

        let result = run(&definition).await;

        assert_step_status(&result, "partial", &StepStatus::Other("partial".into()));
        assert_step_status(&result, "next", &StepStatus::Skipped);
        assert_pipeline_status(&result, PipelineStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_reported_skip_discards_updates_and_blocks_chain() {
        let downstream = Arc::new(CountingWork::new());
        let definition = PipelineBuilder::new("self-skip")
            .then(
                "optional",
                "",
                work_fn(|_| Ok(StepOutcome::skipped().with_update("leaked", json!(true)))),
            )
            .then("next", "", downstream.clone())
            .then("last", "", noop())
            .build()
            .unwrap();

        let result = run(&definition).await;

        assert_eq!(downstream.call_count(), 0);
        assert!(!result.final_context.contains_key("leaked"));
        assert_step_status(&result, "next", &StepStatus::Skipped);
        assert_step_status(&result, "last", &StepStatus::Skipped);
        assert_pipeline_status(&result, PipelineStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_invalid_graph_logs_fix_hint() {
        let sink = CollectingLogSink::shared();
        let definition = PipelineBuilder::new("typo")
            .step("a", "", &["ghsot"], noop())
            .build_unchecked();

        run_pipeline(
            &definition,
            PipelineContext::new(),
            RunOptions::new().with_logger(sink.clone()),
        )
        .await;

        assert!(sink.contains("Pipeline 'typo' failed: Step 'a' references unknown step 'ghsot'"));
        assert!(sink.contains("hint: Check for typos in dependency ids"));
    }

    #[tokio::test]
    async fn test_async_work_receives_context() {
        let definition = PipelineBuilder::new("async")
            .then("seed", "", Arc::new(SetValueWork::new("name", json!("stepflow"))))
            .then(
                "greet",
                "",
                async_work_fn(|ctx: PipelineContext| async move {
                    tokio::task::yield_now().await;
                    let name = ctx.get_str("name").unwrap_or_default().to_string();
                    Ok(StepOutcome::succeeded().with_update("greeting", json!(format!("hello {name}"))))
                }),
            )
            .build()
            .unwrap();

        let result = run(&definition).await;
        assert_eq!(result.final_context.get_str("greeting"), Some("hello stepflow"));
    }

    #[tokio::test]
    async fn test_progress_lines() {
        let sink = CollectingLogSink::shared();
        let definition = PipelineBuilder::new("logged")
            .then("a", "first", noop())
            .then("b", "", Arc::new(FailingWork::new("Intentional failure")))
            .then("c", "", noop())
            .build()
            .unwrap();

        let runner = PipelineRunner::new(
            RunOptions::new()
                .with_verbose(true)
                .with_logger(sink.clone()),
        );
        runner.run(&definition, PipelineContext::new()).await;

        assert!(sink.contains("Pipeline 'logged' started (3 steps)"));
        assert!(sink.contains("Execution order: a -> b -> c"));
        assert!(sink.contains("Running 'a': first"));
        assert!(sink.contains("[succeeded] a ("));
        assert!(sink.contains("[failed] b ("));
        assert!(sink.contains("[skipped] c (dependency 'b' did not succeed)"));
        assert!(sink.contains("Pipeline 'logged' failed in"));
    }

    #[tokio::test]
    async fn test_quiet_run_omits_verbose_lines() {
        let sink = CollectingLogSink::shared();
        let definition = PipelineBuilder::new("quiet")
            .then("a", "described", noop())
            .build()
            .unwrap();

        run_pipeline(
            &definition,
            PipelineContext::new(),
            RunOptions::new().with_logger(sink.clone()),
        )
        .await;

        assert!(!sink.contains("Execution order"));
        assert!(!sink.contains("Running 'a'"));
        assert!(sink.contains("[succeeded] a"));
    }

    #[tokio::test]
    async fn test_empty_pipeline_succeeds() {
        let definition = PipelineBuilder::new("empty").build().unwrap();
        let result = run(&definition).await;

        assert!(result.is_success());
        assert!(result.step_results.is_empty());
        assert!(result.final_context.is_empty());
    }

    #[test]
    fn test_runs_under_blocking_executor() {
        let definition = PipelineBuilder::new("blocking")
            .then("set", "", Arc::new(SetValueWork::new("done", json!(true))))
            .build()
            .unwrap();

        let result = tokio_test::block_on(run(&definition));
        assert_eq!(result.final_context.get_bool("done"), Some(true));
    }
}
