//! The managed server: a start/stop wrapper around [`HttpServer`].
//!
//! `run` binds, announces the resolved address through the logger and blocks
//! serving. `halt` announces the shutdown and drains, bounded by a deadline.
//! The two are meant to be called from different tasks.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::{ServerConfig, Timeouts};
use crate::error::Result;
use crate::http::{HttpServer, ServerState};
use crate::lifecycle::options::{apply_all, ServerOption};
use crate::observability::Logger;

/// An HTTP server with bounded timeouts and a uniform run/halt contract.
///
/// ```no_run
/// use std::time::Duration;
/// use axum::{routing::get, Router};
/// use managed_http::{ManagedServer, ServerConfig};
///
/// # async fn demo() -> Result<(), managed_http::ServerError> {
/// let server = std::sync::Arc::new(ManagedServer::new(
///     Some(ServerConfig {
///         address: "127.0.0.1:8080".into(),
///         handler: Router::new().route("/", get(|| async { "Hello, world!\n" })),
///         ..Default::default()
///     }),
///     [],
/// ));
///
/// let runner = tokio::spawn({
///     let server = server.clone();
///     async move { server.run().await }
/// });
///
/// server.halt_after(Duration::from_secs(10)).await?;
/// runner.await.expect("run task panicked")?;
/// # Ok(())
/// # }
/// ```
pub struct ManagedServer {
    config: ServerConfig,
    server: HttpServer,
    logger: Arc<dyn Logger>,
}

impl ManagedServer {
    /// Create a server from an optional config and ordered options.
    ///
    /// Unset timeouts take the defaults before any option runs; `None` means
    /// an entirely default configuration. Never fails.
    pub fn new(
        config: Option<ServerConfig>,
        options: impl IntoIterator<Item = ServerOption>,
    ) -> Self {
        let config = ServerConfig::resolve(config);
        let options = apply_all(options);
        let server = HttpServer::new(&config);

        Self {
            config,
            server,
            logger: options.logger,
        }
    }

    /// The resolved configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    pub fn timeouts(&self) -> Timeouts {
        self.config.timeouts
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn state(&self) -> ServerState {
        self.server.state()
    }

    /// Resolved listen address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.local_addr()
    }

    /// Number of open client connections.
    pub fn active_connections(&self) -> usize {
        self.server.active_connections()
    }

    /// Wait until `run` has bound (or the server stopped without binding).
    pub async fn started(&self) -> Option<SocketAddr> {
        self.server.started().await
    }

    /// Bind and serve until halted.
    ///
    /// Returns `Ok(())` after a graceful shutdown, [`ServerError::Bind`] if
    /// the address cannot be bound and [`ServerError::Serve`] if accepting
    /// fails.
    ///
    /// [`ServerError::Bind`]: crate::ServerError::Bind
    /// [`ServerError::Serve`]: crate::ServerError::Serve
    pub async fn run(&self) -> Result<()> {
        let logger = &self.logger;
        self.server
            .run(move |addr| logger.log(format_args!("serving on http://{}", addr)))
            .await
    }

    /// Stop accepting and drain in-flight connections until `deadline`.
    ///
    /// Past the deadline the remaining connections are closed and
    /// [`ServerError::ShutdownTimeout`](crate::ServerError::ShutdownTimeout)
    /// is returned. Halting a server that never started is a no-op and does
    /// not prevent a later `run`.
    pub async fn halt(&self, deadline: Instant) -> Result<()> {
        self.logger.log(format_args!("shutting down http server..."));
        self.server.shutdown(deadline).await
    }

    /// [`halt`](Self::halt) with a deadline `grace` from now.
    pub async fn halt_after(&self, grace: Duration) -> Result<()> {
        self.halt(Instant::now() + grace).await
    }

    /// [`halt`](Self::halt) bounded by an arbitrary cancellation future.
    pub async fn halt_when<F>(&self, cancelled: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.logger.log(format_args!("shutting down http server..."));
        self.server.shutdown_when(cancelled).await
    }
}

impl Default for ManagedServer {
    fn default() -> Self {
        Self::new(None, [])
    }
}

impl std::fmt::Debug for ManagedServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedServer")
            .field("address", &self.config.address)
            .field("timeouts", &self.config.timeouts)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DEFAULT_IDLE_TIMEOUT, DEFAULT_READ_HEADER_TIMEOUT, DEFAULT_READ_TIMEOUT,
        DEFAULT_WRITE_TIMEOUT,
    };
    use crate::lifecycle::options::with_logger;
    use std::sync::Mutex;

    #[test]
    fn no_config_is_all_defaults() {
        let server = ManagedServer::new(None, []);
        let timeouts = server.timeouts();
        assert_eq!(timeouts.read, DEFAULT_READ_TIMEOUT);
        assert_eq!(timeouts.read_header, DEFAULT_READ_HEADER_TIMEOUT);
        assert_eq!(timeouts.write, DEFAULT_WRITE_TIMEOUT);
        assert_eq!(timeouts.idle, DEFAULT_IDLE_TIMEOUT);
        assert_eq!(server.state(), ServerState::Created);
    }

    #[test]
    fn explicit_timeouts_survive() {
        let minute = Duration::from_secs(60);
        let explicit = Timeouts {
            read: minute,
            read_header: minute,
            write: minute,
            idle: minute,
        };
        let server = ManagedServer::new(
            Some(ServerConfig {
                timeouts: explicit,
                ..Default::default()
            }),
            [],
        );
        assert_eq!(server.timeouts(), explicit);
    }

    #[tokio::test]
    async fn halt_before_run_announces_and_returns() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = lines.clone();
        let server = ManagedServer::new(
            None,
            [with_logger(Arc::new(move |args: std::fmt::Arguments<'_>| {
                sink.lock().unwrap().push(args.to_string())
            }))],
        );

        server.halt(Instant::now()).await.unwrap();
        assert_eq!(*lines.lock().unwrap(), vec!["shutting down http server..."]);
        assert_eq!(server.state(), ServerState::Created);
    }
}
