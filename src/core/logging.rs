//! Logging setup for hosts embedding the archetype engine.
//!
//! The engine itself only emits `tracing` events (and the config layer uses
//! the `log` facade). Nothing is printed unless the host installs a
//! subscriber, either its own or the one built here.

use std::io;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-line output with colors.
    #[default]
    Pretty,
    /// One JSON object per event, for ingestion by log tooling.
    Json,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,

    #[error("Failed to redirect log records to tracing: {0}")]
    LogBridge(#[from] log::SetLoggerError),
}

/// Initialize pretty logging to stderr.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g.
/// `"class_archetypes=debug"`) is used.
pub fn init(default_directive: &str) -> Result<(), LoggingError> {
    init_with_format(default_directive, LogFormat::Pretty)
}

/// Initialize logging to stderr in the given format.
///
/// This sets up:
/// 1. Redirects standard `log` crate events to `tracing`.
/// 2. An `EnvFilter` from `RUST_LOG`, falling back to `default_directive`.
/// 3. A global fmt subscriber writing to stderr.
///
/// Returns [`LoggingError::AlreadyInitialized`] if a global subscriber is
/// already in place, and [`LoggingError::LogBridge`] if the host already
/// installed a `log` logger. Either way nothing is installed by this call.
pub fn init_with_format(default_directive: &str, format: LogFormat) -> Result<(), LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Err(LoggingError::AlreadyInitialized);
    }

    tracing_log::LogTracer::init()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .with_target(true);

    let installed = match format {
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(
            builder.json().with_file(true).with_line_number(true).finish(),
        ),
    };
    installed.map_err(|_| LoggingError::AlreadyInitialized)?;

    log::debug!("Logging initialized ({:?} format)", format);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
