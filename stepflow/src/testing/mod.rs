//! Testing utilities for stepflow pipelines.
//!
//! This module provides:
//! - Step work doubles (counting, failing, erroring, panicking, slow)
//! - Assertions over pipeline run results

mod assertions;
mod mocks;

pub use assertions::{assert_pipeline_status, assert_step_failed_with, assert_step_status};
pub use mocks::{
    AddToCounterWork, CountingWork, ErroringWork, FailingWork, PanickingWork, SetValueWork,
    SlowWork,
};
