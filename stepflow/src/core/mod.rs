//! Core domain model types for stepflow.
//!
//! This module contains the fundamental types shared by the resolver,
//! the runner and step implementations:
//! - Step and pipeline status enums
//! - The step outcome returned by work functions

mod outcome;
mod status;

pub use outcome::StepOutcome;
pub use status::{PipelineStatus, StepStatus};
