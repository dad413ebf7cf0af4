//! Progress logging for pipeline runs.
//!
//! The runner reports human-readable progress through a [`LogSink`]. This is
//! separate from the engine's own `tracing` output.

mod sink;

pub use sink::{CollectingLogSink, LogSink, NoOpLogSink, TracingLogSink};
