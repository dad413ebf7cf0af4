//! Bounded work-pool for independent units of work.
//!
//! A fixed number of workers drain a shared list through an atomic cursor.
//! Each worker claims the next index, runs that unit to completion, then
//! claims another, until the list is exhausted.

use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Default ceiling on concurrent workers.
///
/// Units typically drive a shared external backend; more workers than this
/// overwhelm it.
pub const DEFAULT_HARD_CAP: usize = 4;

/// Runs independent units with bounded concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkPool {
    requested: usize,
    hard_cap: usize,
}

impl Default for WorkPool {
    fn default() -> Self {
        Self::new(1)
    }
}

impl WorkPool {
    /// Creates a pool with the requested concurrency and the default hard cap.
    #[must_use]
    pub const fn new(requested: usize) -> Self {
        Self {
            requested,
            hard_cap: DEFAULT_HARD_CAP,
        }
    }

    /// Overrides the hard cap. A cap of zero is treated as one.
    #[must_use]
    pub const fn with_hard_cap(mut self, hard_cap: usize) -> Self {
        self.hard_cap = if hard_cap == 0 { 1 } else { hard_cap };
        self
    }

    /// Returns the requested concurrency.
    #[must_use]
    pub const fn requested(&self) -> usize {
        self.requested
    }

    /// Returns the hard cap.
    #[must_use]
    pub const fn hard_cap(&self) -> usize {
        self.hard_cap
    }

    /// Number of workers used for `units` units of work.
    ///
    /// `min(requested, hard_cap, units)`, never below one unless there is no
    /// work at all.
    #[must_use]
    pub fn effective_concurrency(&self, units: usize) -> usize {
        if units == 0 {
            return 0;
        }
        self.requested.min(self.hard_cap).min(units).max(1)
    }

    /// Runs every unit and returns the results in completion order.
    ///
    /// Requests above the hard cap are clamped with a warning. A unit whose
    /// future panics is logged and produces no result; its worker moves on to
    /// the next unit.
    pub async fn run<T, R, F, Fut>(&self, units: Vec<T>, work: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let total = units.len();
        if self.requested > self.hard_cap {
            warn!(
                requested = self.requested,
                hard_cap = self.hard_cap,
                "Requested concurrency exceeds hard cap; clamping"
            );
        }
        let workers = self.effective_concurrency(total);
        if workers == 0 {
            return Vec::new();
        }
        debug!(units = total, workers, "Starting work pool");

        let slots: Arc<Vec<Mutex<Option<T>>>> =
            Arc::new(units.into_iter().map(|u| Mutex::new(Some(u))).collect());
        let cursor = Arc::new(AtomicUsize::new(0));
        let results: Arc<Mutex<Vec<R>>> = Arc::new(Mutex::new(Vec::with_capacity(total)));
        let work = Arc::new(work);

        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let slots = Arc::clone(&slots);
            let cursor = Arc::clone(&cursor);
            let results = Arc::clone(&results);
            let work = Arc::clone(&work);

            handles.push(tokio::spawn(async move {
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= slots.len() {
                        break;
                    }
                    let Some(unit) = slots[index].lock().take() else {
                        continue;
                    };
                    debug!(worker, index, "Unit claimed");
                    match AssertUnwindSafe((*work)(unit)).catch_unwind().await {
                        Ok(result) => results.lock().push(result),
                        Err(_) => error!(worker, index, "Unit panicked; no result recorded"),
                    }
                }
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Work pool worker terminated abnormally");
            }
        }

        let mut collected = results.lock();
        std::mem::take(&mut *collected)
    }
}
