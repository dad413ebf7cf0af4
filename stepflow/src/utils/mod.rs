//! Utility functions for run ids, timestamps and durations.

pub mod timestamps;

pub use timestamps::{elapsed_ms, now_utc, Timestamp};

use uuid::Uuid;

/// Generates a fresh id for a single pipeline run.
#[must_use]
pub fn generate_run_id() -> Uuid {
    Uuid::new_v4()
}
