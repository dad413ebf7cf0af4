//! # Stepflow
//!
//! A small engine for running named steps in dependency order.
//!
//! Stepflow provides:
//!
//! - **Dependency resolution**: a stable topological order that rejects
//!   duplicate ids, unknown dependencies and cycles
//! - **Sequential execution**: one step at a time against a shared context,
//!   with cascading skip when a dependency does not succeed
//! - **Structured results**: per-step status, timing and errors, plus the
//!   final merged context
//! - **Bounded batches**: a work-pool that runs independent pipelines with a
//!   capped number of workers
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use stepflow::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let pipeline = PipelineBuilder::new("numbers")
//!     .then("seed", "put a value in context", work_fn(|_| {
//!         Ok(StepOutcome::succeeded().with_update("value", json!(1)))
//!     }))
//!     .then("double", "double it", work_fn(|ctx| {
//!         let value = ctx.get_i64("value").unwrap_or_default();
//!         Ok(StepOutcome::succeeded().with_update("value", json!(value * 2)))
//!     }))
//!     .build()?;
//!
//! let result = run_pipeline(&pipeline, PipelineContext::new(), RunOptions::new()).await;
//! assert!(result.is_success());
//! assert_eq!(result.final_context.get_i64("value"), Some(2));
//! # Ok::<(), StepflowError>(())
//! # }).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod pool;
pub mod steps;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::context::PipelineContext;
    pub use crate::core::{PipelineStatus, StepOutcome, StepStatus};
    pub use crate::errors::{ResolveError, StepflowError};
    pub use crate::events::{CollectingLogSink, LogSink, NoOpLogSink, TracingLogSink};
    pub use crate::pipeline::{
        resolve_order, run_pipeline, PipelineBuilder, PipelineDefinition, PipelineRunResult,
        PipelineRunner, RunOptions, StepResult, StepSpec,
    };
    pub use crate::pool::{run_pipelines, PipelineJob, WorkPool};
    pub use crate::steps::{async_work_fn, work_fn, StepWork};
}
