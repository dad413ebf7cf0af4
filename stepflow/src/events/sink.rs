//! Progress log sink trait and implementations.

use std::sync::Arc;
use tracing::{debug, info, Level};

/// Receives free-text progress lines from a pipeline run.
///
/// Sinks have no effect on control flow and must never panic.
pub trait LogSink: Send + Sync {
    /// Records a single progress line.
    fn log(&self, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, line: &str) {
        self(line);
    }
}

/// A sink that discards all lines.
///
/// Used as the default when no logger is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogSink;

impl LogSink for NoOpLogSink {
    fn log(&self, _line: &str) {}
}

/// A sink that forwards lines to the tracing framework.
#[derive(Debug, Clone)]
pub struct TracingLogSink {
    /// The log level to use.
    level: Level,
}

impl Default for TracingLogSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl TracingLogSink {
    /// Creates a new tracing sink with the specified level.
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level tracing sink.
    #[must_use]
    pub const fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl LogSink for TracingLogSink {
    fn log(&self, line: &str) {
        if self.level == Level::DEBUG {
            debug!(target: "stepflow::progress", "{line}");
        } else {
            info!(target: "stepflow::progress", "{line}");
        }
    }
}

/// A sink that keeps every line, for tests and for rendering summaries later.
#[derive(Debug, Default)]
pub struct CollectingLogSink {
    lines: parking_lot::RwLock<Vec<String>>,
}

impl CollectingLogSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collecting sink already wrapped for sharing.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns all collected lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.read().clone()
    }

    /// Returns the number of collected lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.read().is_empty()
    }

    /// Returns true if any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.read().iter().any(|l| l.contains(needle))
    }

    /// Clears all collected lines.
    pub fn clear(&self) {
        self.lines.write().clear();
    }
}

impl LogSink for CollectingLogSink {
    fn log(&self, line: &str) {
        self.lines.write().push(line.to_string());
    }
}
