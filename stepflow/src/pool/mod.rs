//! Bounded concurrency across independent pipeline instances.
//!
//! This is the only place the engine runs work in parallel. Each unit is
//! still a single sequential pipeline run with its own context.

mod batch;
mod work_pool;

pub use batch::{run_pipelines, PipelineJob};
pub use work_pool::{WorkPool, DEFAULT_HARD_CAP};
