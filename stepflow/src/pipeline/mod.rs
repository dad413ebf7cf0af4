//! Pipeline definition, resolution and execution.
//!
//! This module provides:
//! - Step and pipeline definitions
//! - A builder with graph validation
//! - The dependency resolver (stable topological order)
//! - The sequential runner and its structured result

mod builder;
#[cfg(test)]
mod integration_tests;
mod options;
mod resolver;
mod result;
mod runner;
mod spec;

pub use builder::PipelineBuilder;
pub use options::RunOptions;
pub use resolver::resolve_order;
pub use result::{PipelineRunResult, StepResult, RESOLUTION_STEP_ID};
pub use runner::{run_pipeline, PipelineRunner};
pub use spec::{PipelineDefinition, StepSpec};
