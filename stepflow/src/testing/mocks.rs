//! Test doubles for step work.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::context::PipelineContext;
use crate::core::StepOutcome;
use crate::steps::StepWork;

/// Succeeds and counts how many times it was invoked.
#[derive(Debug, Default)]
pub struct CountingWork {
    calls: AtomicUsize,
}

impl CountingWork {
    /// Creates a new counting step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of invocations so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StepWork for CountingWork {
    async fn run(&self, _ctx: &PipelineContext) -> anyhow::Result<StepOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(StepOutcome::succeeded())
    }
}

/// Reports a `failed` outcome with a fixed message.
#[derive(Debug, Clone)]
pub struct FailingWork {
    message: String,
}

impl FailingWork {
    /// Creates a new failing step.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl StepWork for FailingWork {
    async fn run(&self, _ctx: &PipelineContext) -> anyhow::Result<StepOutcome> {
        Ok(StepOutcome::failed(&self.message))
    }
}

/// Returns an error instead of an outcome.
#[derive(Debug, Clone)]
pub struct ErroringWork {
    message: String,
}

impl ErroringWork {
    /// Creates a new erroring step.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl StepWork for ErroringWork {
    async fn run(&self, _ctx: &PipelineContext) -> anyhow::Result<StepOutcome> {
        Err(anyhow::anyhow!("{}", self.message))
    }
}

/// Panics with a fixed message.
#[derive(Debug, Clone)]
pub struct PanickingWork {
    message: String,
}

impl PanickingWork {
    /// Creates a new panicking step.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl StepWork for PanickingWork {
    async fn run(&self, _ctx: &PipelineContext) -> anyhow::Result<StepOutcome> {
        panic!("{}", self.message);
    }
}

/// Sleeps before succeeding.
#[derive(Debug, Clone)]
pub struct SlowWork {
    delay: Duration,
}

impl SlowWork {
    /// Creates a new slow step.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a slow step with delay in milliseconds.
    #[must_use]
    pub const fn with_delay_ms(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait]
impl StepWork for SlowWork {
    async fn run(&self, _ctx: &PipelineContext) -> anyhow::Result<StepOutcome> {
        tokio::time::sleep(self.delay).await;
        Ok(StepOutcome::succeeded())
    }
}

/// Sets a single context key to a fixed value.
#[derive(Debug, Clone)]
pub struct SetValueWork {
    key: String,
    value: serde_json::Value,
}

impl SetValueWork {
    /// Creates a step that writes `key = value`.
    #[must_use]
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

#[async_trait]
impl StepWork for SetValueWork {
    async fn run(&self, _ctx: &PipelineContext) -> anyhow::Result<StepOutcome> {
        Ok(StepOutcome::succeeded().with_update(&self.key, self.value.clone()))
    }
}

/// Adds a fixed amount to an integer context key, treating a missing key as 0.
///
/// Records the value it saw on each call.
#[derive(Debug)]
pub struct AddToCounterWork {
    key: String,
    amount: i64,
    seen: Mutex<Vec<i64>>,
}

impl AddToCounterWork {
    /// Creates a step that performs `key += amount`.
    #[must_use]
    pub fn new(key: impl Into<String>, amount: i64) -> Self {
        Self {
            key: key.into(),
            amount,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Returns the counter values observed before each update.
    #[must_use]
    pub fn seen(&self) -> Vec<i64> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl StepWork for AddToCounterWork {
    async fn run(&self, ctx: &PipelineContext) -> anyhow::Result<StepOutcome> {
        let current = ctx.get_i64(&self.key).unwrap_or(0);
        self.seen.lock().push(current);
        Ok(StepOutcome::succeeded().with_update(&self.key, serde_json::json!(current + self.amount)))
    }
}
