//! Options controlling a single pipeline run.

use crate::events::{LogSink, NoOpLogSink};
use std::fmt;
use std::sync::Arc;

/// Run options: dry-run, verbosity and the progress logger.
#[derive(Clone)]
pub struct RunOptions {
    /// Resolve and report without invoking any work.
    pub dry_run: bool,
    /// Emit detailed progress lines.
    pub verbose: bool,
    /// Receives progress lines.
    pub logger: Arc<dyn LogSink>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            verbose: false,
            logger: Arc::new(NoOpLogSink),
        }
    }
}

impl RunOptions {
    /// Creates default options: real run, quiet, no logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets verbose mode.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the progress logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LogSink>) -> Self {
        self.logger = logger;
        self
    }

    pub(crate) fn log(&self, line: &str) {
        self.logger.log(line);
    }

    pub(crate) fn log_verbose(&self, line: &str) {
        if self.verbose {
            self.logger.log(line);
        }
    }
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}
