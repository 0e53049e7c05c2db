//! Shared utilities for integration tests.

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use managed_http::{with_logger, Logger, ManagedServer, ServerConfig, ServerError, Timeouts};
use tokio::task::JoinHandle;

/// Logger that records every announcement.
#[derive(Clone, Default)]
pub struct RecordingLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingLogger {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push(args.to_string());
    }
}

/// A server running in the background on an ephemeral loopback port.
pub struct Running {
    pub server: Arc<ManagedServer>,
    pub addr: SocketAddr,
    pub logger: RecordingLogger,
    pub runner: JoinHandle<Result<(), ServerError>>,
}

#[allow(dead_code)]
impl Running {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait for `run` to return.
    pub async fn join(self) -> Result<(), ServerError> {
        tokio::time::timeout(Duration::from_secs(5), self.runner)
            .await
            .expect("run did not return in time")
            .expect("run task panicked")
    }
}

/// Start `handler` with the given timeouts and a recording logger.
pub async fn start(handler: Router, timeouts: Timeouts) -> Running {
    let logger = RecordingLogger::default();
    let server = Arc::new(ManagedServer::new(
        Some(ServerConfig {
            address: "127.0.0.1:0".into(),
            handler,
            timeouts,
        }),
        [with_logger(Arc::new(logger.clone()))],
    ));

    let runner = {
        let server = server.clone();
        tokio::spawn(async move { server.run().await })
    };

    let addr = tokio::time::timeout(Duration::from_secs(5), server.started())
        .await
        .expect("server did not start in time")
        .expect("server stopped before binding");

    Running {
        server,
        addr,
        logger,
        runner,
    }
}

/// HTTP client that does not keep idle connections around.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
