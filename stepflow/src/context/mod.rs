//! Context management for pipeline execution.
//!
//! The context is the only channel of data flow between steps.

mod shared;

pub use shared::PipelineContext;
