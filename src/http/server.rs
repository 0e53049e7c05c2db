//! HTTP server primitive.
//!
//! # Responsibilities
//! - Own the lifecycle state (`Created → Running → Draining → Stopped`)
//! - Bind the listener and run the accept loop
//! - Serve each connection with hyper (HTTP/1.1 and HTTP/2)
//! - Enforce read, read-header, write and idle timeouts
//! - Drain in-flight connections on shutdown, force-close at the deadline
//!
//! All synchronization between `run` and `shutdown` lives here; callers only
//! issue start and stop commands.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::Instant;
use tower::ServiceExt;
use tower_http::timeout::{RequestBodyTimeoutLayer, ResponseBodyTimeoutLayer, TimeoutLayer};

use crate::config::{ServerConfig, Timeouts};
use crate::error::{Result, ServerError};
use crate::net::connection::{Activity, ActivityStream, ConnectionTracker};
use crate::net::listener::{self, is_transient_accept_error};

/// Pause after a transient accept error before accepting again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Lifecycle state of an [`HttpServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Constructed, nothing bound yet.
    Created,
    /// Accepting connections on the resolved address.
    Running(SocketAddr),
    /// No longer accepting; waiting for in-flight connections.
    Draining,
    /// Accept loop has exited.
    Stopped,
}

impl ServerState {
    pub fn is_running(&self) -> bool {
        matches!(self, ServerState::Running(_))
    }
}

/// HTTP server bound to one address with fixed per-connection timeouts.
pub struct HttpServer {
    address: String,
    timeouts: Timeouts,
    router: Router,
    state: watch::Sender<ServerState>,
    force_close: watch::Sender<bool>,
    connections: ConnectionTracker,
}

impl HttpServer {
    /// Create a server from a configuration.
    ///
    /// Unset (zero) timeouts fall back to the defaults so the server never
    /// runs unbounded.
    pub fn new(config: &ServerConfig) -> Self {
        let (state, _) = watch::channel(ServerState::Created);
        let (force_close, _) = watch::channel(false);
        let timeouts = config.timeouts.or_defaults();

        Self {
            address: config.address.clone(),
            timeouts,
            router: Self::build_router(config.handler.clone(), &timeouts),
            state,
            force_close,
            connections: ConnectionTracker::new(),
        }
    }

    /// Wrap the handler with the read and write timeout layers.
    #[allow(deprecated)]
    fn build_router(handler: Router, timeouts: &Timeouts) -> Router {
        handler
            .layer(TimeoutLayer::new(timeouts.write))
            .layer(ResponseBodyTimeoutLayer::new(timeouts.write))
            .layer(RequestBodyTimeoutLayer::new(timeouts.read))
    }

    fn connection_builder(&self) -> Builder<TokioExecutor> {
        let mut builder = Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.timeouts.read_header)
            .keep_alive(true);
        builder.http2().timer(TokioTimer::new());
        builder
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Resolved listen address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self.state() {
            ServerState::Running(addr) => Some(addr),
            _ => None,
        }
    }

    /// Number of open connections.
    pub fn active_connections(&self) -> usize {
        self.connections.active_count()
    }

    /// Wait until the server has left `Created`.
    ///
    /// Returns the bound address if it is running at that point.
    pub async fn started(&self) -> Option<SocketAddr> {
        let mut rx = self.state.subscribe();
        let state = match rx.wait_for(|s| *s != ServerState::Created).await {
            Ok(state) => *state,
            Err(_) => return None,
        };
        match state {
            ServerState::Running(addr) => Some(addr),
            _ => None,
        }
    }

    /// Bind the configured address and serve until shut down.
    ///
    /// `on_bound` is called with the resolved address before the first
    /// accept. Returns `Ok(())` after a graceful shutdown, and also
    /// immediately if the server has already stopped.
    pub async fn run<F>(&self, on_bound: F) -> Result<()>
    where
        F: FnOnce(SocketAddr),
    {
        match self.state() {
            ServerState::Created => {}
            ServerState::Running(_) | ServerState::Draining => {
                return Err(ServerError::AlreadyRunning)
            }
            ServerState::Stopped => return Ok(()),
        }

        let (listener, addr) = listener::bind(&self.address).await?;

        let mut previous = ServerState::Created;
        let claimed = self.state.send_if_modified(|state| {
            previous = *state;
            if *state == ServerState::Created {
                *state = ServerState::Running(addr);
                true
            } else {
                false
            }
        });
        if !claimed {
            return match previous {
                ServerState::Stopped => Ok(()),
                _ => Err(ServerError::AlreadyRunning),
            };
        }

        tracing::info!(
            address = %addr,
            read_timeout = ?self.timeouts.read,
            read_header_timeout = ?self.timeouts.read_header,
            write_timeout = ?self.timeouts.write,
            idle_timeout = ?self.timeouts.idle,
            "HTTP server starting"
        );
        on_bound(addr);

        self.accept_loop(listener).await
    }

    async fn accept_loop(&self, listener: TcpListener) -> Result<()> {
        let builder = self.connection_builder();
        let mut state = self.state.subscribe();

        let outcome = loop {
            tokio::select! {
                biased;
                _ = wait_until_not_running(&mut state) => break Ok(()),
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if !self.state().is_running() {
                            // Shutdown won the race; refuse the connection.
                            drop(stream);
                            break Ok(());
                        }
                        self.spawn_connection(stream, peer, &builder);
                    }
                    Err(err) if is_transient_accept_error(&err) => {
                        tracing::warn!(error = %err, "Transient accept error, backing off");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                    Err(err) => break Err(err),
                },
            }
        };

        drop(listener);

        if let Err(err) = outcome {
            tracing::error!(error = %err, "Accept loop failed");
            // Open connections see the state change and finish gracefully.
            self.state.send_replace(ServerState::Stopped);
            return Err(ServerError::Serve(err));
        }

        tracing::info!(
            active = self.connections.active_count(),
            "Listener closed, draining connections"
        );

        let mut force = self.force_close.subscribe();
        tokio::select! {
            _ = self.connections.wait_for_idle() => {
                tracing::info!("All connections drained");
            }
            _ = wait_for_force_close(&mut force) => {
                tracing::warn!(
                    remaining = self.connections.active_count(),
                    "Drain cut short, connections force-closed"
                );
            }
        }

        self.state.send_replace(ServerState::Stopped);
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    fn spawn_connection(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        builder: &Builder<TokioExecutor>,
    ) {
        let guard = self.connections.track();
        let id = guard.id();
        let activity = Activity::new();
        let io = TokioIo::new(ActivityStream::new(stream, activity.clone()));

        let router = self.router.clone();
        let requests = activity.clone();
        let service = service_fn(move |request: Request<Incoming>| {
            let in_flight = requests.begin_request();
            let response = router.clone().oneshot(request);
            async move {
                let response = response.await;
                drop(in_flight);
                response
            }
        });

        let builder = builder.clone();
        let mut state = self.state.subscribe();
        let mut force = self.force_close.subscribe();
        let idle_timeout = self.timeouts.idle;
        let write_timeout = self.timeouts.write;

        tracing::debug!(connection_id = %id, peer = %peer, "Connection accepted");

        tokio::spawn(async move {
            let conn = builder.serve_connection(io, service);
            tokio::pin!(conn);
            let mut closing = false;

            loop {
                tokio::select! {
                    result = conn.as_mut() => {
                        if let Err(err) = result {
                            tracing::debug!(
                                connection_id = %id,
                                peer = %peer,
                                error = %err,
                                "Connection error"
                            );
                        }
                        break;
                    }
                    _ = wait_until_not_running(&mut state), if !closing => {
                        closing = true;
                        conn.as_mut().graceful_shutdown();
                    }
                    _ = activity.idle_expired(idle_timeout), if !closing => {
                        tracing::debug!(
                            connection_id = %id,
                            "Idle timeout reached, closing connection"
                        );
                        closing = true;
                        conn.as_mut().graceful_shutdown();
                    }
                    // A graceful close still has to flush the last response,
                    // which a client that stops reading would block forever.
                    _ = activity.write_window_elapsed(write_timeout), if closing => {
                        tracing::debug!(
                            connection_id = %id,
                            peer = %peer,
                            "Write timeout reached while closing, dropping connection"
                        );
                        break;
                    }
                    _ = wait_for_force_close(&mut force) => {
                        tracing::debug!(
                            connection_id = %id,
                            peer = %peer,
                            "Connection force-closed"
                        );
                        break;
                    }
                }
            }

            drop(guard);
        });
    }

    /// Stop accepting and drain until `deadline`.
    pub async fn shutdown(&self, deadline: Instant) -> Result<()> {
        self.shutdown_when(tokio::time::sleep_until(deadline)).await
    }

    /// Stop accepting and drain until `cancelled` resolves.
    ///
    /// A no-op before the server has started and after it has stopped.
    /// If `cancelled` resolves first, every remaining connection task is
    /// stopped, which closes its socket, and [`ServerError::ShutdownTimeout`]
    /// is returned. HTTP/2 stream handlers already spawned on the executor
    /// are not aborted directly; they end once hyper sees the stream reset.
    pub async fn shutdown_when<F>(&self, cancelled: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut previous = ServerState::Created;
        self.state.send_if_modified(|state| {
            previous = *state;
            if state.is_running() {
                *state = ServerState::Draining;
                true
            } else {
                false
            }
        });

        match previous {
            ServerState::Created => {
                tracing::debug!("Shutdown requested before start, nothing to drain");
                return Ok(());
            }
            ServerState::Stopped => return Ok(()),
            ServerState::Running(addr) => {
                tracing::info!(
                    address = %addr,
                    active = self.connections.active_count(),
                    "Graceful shutdown started"
                );
            }
            ServerState::Draining => {
                tracing::debug!("Graceful shutdown already in progress");
            }
        }

        tokio::select! {
            biased;
            _ = self.connections.wait_for_idle() => Ok(()),
            _ = cancelled => {
                let in_flight = self.connections.active_count();
                if in_flight == 0 {
                    return Ok(());
                }
                tracing::warn!(in_flight, "Shutdown deadline exceeded, force-closing connections");
                self.force_close.send_replace(true);
                Err(ServerError::ShutdownTimeout { in_flight })
            }
        }
    }
}

async fn wait_until_not_running(rx: &mut watch::Receiver<ServerState>) {
    // Sender outlives every receiver handed out by the server.
    let _ = rx.wait_for(|state| !state.is_running()).await;
}

async fn wait_for_force_close(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|forced| *forced).await;
}
