//! Running many independent pipeline instances through a work-pool.

use super::WorkPool;
use crate::context::PipelineContext;
use crate::pipeline::{PipelineDefinition, PipelineRunResult, PipelineRunner, RunOptions};
use std::sync::Arc;
use tracing::info;

/// One pipeline invocation: a definition plus its own initial context.
#[derive(Debug, Clone)]
pub struct PipelineJob {
    /// The pipeline to run.
    pub definition: PipelineDefinition,
    /// The context the run starts from.
    pub initial_context: PipelineContext,
}

impl PipelineJob {
    /// Creates a new job.
    #[must_use]
    pub const fn new(definition: PipelineDefinition, initial_context: PipelineContext) -> Self {
        Self {
            definition,
            initial_context,
        }
    }
}

/// Runs each job as its own sequential pipeline, at most `pool`'s effective
/// concurrency at a time.
///
/// Results come back in completion order; match them to jobs by
/// `pipeline_id`.
pub async fn run_pipelines(
    pool: &WorkPool,
    jobs: Vec<PipelineJob>,
    options: RunOptions,
) -> Vec<PipelineRunResult> {
    let total = jobs.len();
    let runner = Arc::new(PipelineRunner::new(options));

    let results = pool
        .run(jobs, move |job| {
            let runner = Arc::clone(&runner);
            async move { runner.run(&job.definition, job.initial_context).await }
        })
        .await;

    let failed = results.iter().filter(|r| !r.is_success()).count();
    info!(pipelines = total, completed = results.len(), failed, "Batch finished");
    results
}
