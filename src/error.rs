//! Server lifecycle errors.
//!
//! `run` and `halt` never retry or swallow failures; each variant tells the
//! supervising caller which part of the lifecycle failed so it can pick its own
//! restart policy. A clean shutdown is `Ok(())`, not an error.

use std::io;

use thiserror::Error;

/// Errors surfaced by [`ManagedServer::run`](crate::ManagedServer::run) and
/// [`ManagedServer::halt`](crate::ManagedServer::halt).
#[derive(Error, Debug)]
pub enum ServerError {
    /// The configured address could not be bound. Fatal to `run`.
    #[error("failed to bind {address:?}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The accept loop failed for a reason other than graceful shutdown.
    #[error("server failed while serving: {0}")]
    Serve(#[source] io::Error),

    /// The drain deadline elapsed first; remaining connections were force-closed.
    #[error("shutdown deadline exceeded with {in_flight} connection(s) still open")]
    ShutdownTimeout { in_flight: usize },

    /// `run` was called while the server was already serving or draining.
    #[error("server is already running")]
    AlreadyRunning,
}

impl ServerError {
    /// True for the drain-deadline case, which is not fatal to the host process.
    pub fn is_shutdown_timeout(&self) -> bool {
        matches!(self, ServerError::ShutdownTimeout { .. })
    }
}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, ServerError>;
