//! Lifecycle announcements and structured logging setup.
//!
//! # Responsibilities
//! - Define the `Logger` capability used for start/stop announcements
//! - Provide the stderr default and a `tracing` adapter
//! - Initialize the tracing subscriber for the binary
//!
//! # Design Decisions
//! - Loggers are injected per server; there is no process-wide logger
//! - Implementations must tolerate concurrent writes (`Send + Sync`)
//! - Structured `tracing` events are emitted independently of the `Logger`

use std::fmt;
use std::io::Write;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prefix used by [`StderrLogger::default`].
pub const DEFAULT_PREFIX: &str = "managed-http: ";

/// A formatted-write capability.
///
/// Callers pass pre-formatted arguments, e.g.
/// `logger.log(format_args!("serving on http://{addr}"))`.
pub trait Logger: Send + Sync {
    fn log(&self, args: fmt::Arguments<'_>);
}

impl<F> Logger for F
where
    F: Fn(fmt::Arguments<'_>) + Send + Sync,
{
    fn log(&self, args: fmt::Arguments<'_>) {
        self(args)
    }
}

/// Writes one line per message to standard error with a fixed prefix.
#[derive(Debug, Clone)]
pub struct StderrLogger {
    prefix: String,
}

impl StderrLogger {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for StderrLogger {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl Logger for StderrLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        // Holding the lock keeps prefix and message on one line.
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}{}", self.prefix, args);
    }
}

/// Forwards announcements to `tracing` at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "managed_http::announce", "{}", args);
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
