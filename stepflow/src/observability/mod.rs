//! Global `tracing` subscriber setup.
//!
//! The library itself only emits events; binaries and test harnesses call
//! [`init_tracing`] once to see them.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format for the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Builds the filter: `stepflow=debug` when verbose, else `RUST_LOG` or
/// `stepflow=info`.
#[must_use]
pub fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("stepflow=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stepflow=info"))
    }
}

/// Installs a human-readable subscriber.
///
/// Returns false if a global subscriber was already set.
pub fn init_tracing(verbose: bool) -> bool {
    init_tracing_with(verbose, LogFormat::Pretty)
}

/// Installs a subscriber with the given format.
///
/// Returns false if a global subscriber was already set.
pub fn init_tracing_with(verbose: bool, format: LogFormat) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(verbose));
    match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    }
    .is_ok()
}
