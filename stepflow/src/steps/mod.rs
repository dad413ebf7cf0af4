//! Step work trait and closure adapters.
//!
//! A step's work is opaque to the engine: it receives the context accumulated
//! so far and reports a [`StepOutcome`]. Returning `Err` is treated exactly
//! like a reported failure, with the error's message recorded.

use crate::context::PipelineContext;
use crate::core::StepOutcome;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// The unit of work attached to a step.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StepWork: Send + Sync {
    /// Runs the step against a read view of the shared context.
    async fn run(&self, ctx: &PipelineContext) -> anyhow::Result<StepOutcome>;
}

/// A step backed by a synchronous closure.
pub struct FnWork<F>
where
    F: Fn(&PipelineContext) -> anyhow::Result<StepOutcome> + Send + Sync,
{
    func: F,
}

impl<F> FnWork<F>
where
    F: Fn(&PipelineContext) -> anyhow::Result<StepOutcome> + Send + Sync,
{
    /// Creates a new closure-backed step.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> fmt::Debug for FnWork<F>
where
    F: Fn(&PipelineContext) -> anyhow::Result<StepOutcome> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnWork").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> StepWork for FnWork<F>
where
    F: Fn(&PipelineContext) -> anyhow::Result<StepOutcome> + Send + Sync,
{
    async fn run(&self, ctx: &PipelineContext) -> anyhow::Result<StepOutcome> {
        (self.func)(ctx)
    }
}

/// A step backed by an async closure.
///
/// The closure receives an owned copy of the context so the returned future
/// can be `'static`.
pub struct AsyncFnWork<F, Fut>
where
    F: Fn(PipelineContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<StepOutcome>> + Send,
{
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnWork<F, Fut>
where
    F: Fn(PipelineContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<StepOutcome>> + Send,
{
    /// Creates a new async closure-backed step.
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut> fmt::Debug for AsyncFnWork<F, Fut>
where
    F: Fn(PipelineContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<StepOutcome>> + Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFnWork").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> StepWork for AsyncFnWork<F, Fut>
where
    F: Fn(PipelineContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<StepOutcome>> + Send,
{
    async fn run(&self, ctx: &PipelineContext) -> anyhow::Result<StepOutcome> {
        (self.func)(ctx.clone()).await
    }
}

/// Wraps a synchronous closure as shareable step work.
pub fn work_fn<F>(func: F) -> Arc<dyn StepWork>
where
    F: Fn(&PipelineContext) -> anyhow::Result<StepOutcome> + Send + Sync + 'static,
{
    Arc::new(FnWork::new(func))
}

/// Wraps an async closure as shareable step work.
pub fn async_work_fn<F, Fut>(func: F) -> Arc<dyn StepWork>
where
    F: Fn(PipelineContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<StepOutcome>> + Send + 'static,
{
    Arc::new(AsyncFnWork::new(func))
}

/// Step work that succeeds without touching the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpWork;

#[async_trait]
impl StepWork for NoOpWork {
    async fn run(&self, _ctx: &PipelineContext) -> anyhow::Result<StepOutcome> {
        Ok(StepOutcome::succeeded())
    }
}
