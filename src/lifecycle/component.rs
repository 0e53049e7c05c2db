//! The uniform contract a process supervisor drives.

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::ServerError;
use crate::lifecycle::managed::ManagedServer;

/// A long-running component that can be started and stopped.
///
/// `run` blocks until the component terminates; `halt` is called from
/// another task and must return by `deadline`.
#[async_trait]
pub trait Component: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn run(&self) -> Result<(), Self::Error>;

    async fn halt(&self, deadline: Instant) -> Result<(), Self::Error>;
}

#[async_trait]
impl Component for ManagedServer {
    type Error = ServerError;

    async fn run(&self) -> Result<(), ServerError> {
        ManagedServer::run(self).await
    }

    async fn halt(&self, deadline: Instant) -> Result<(), ServerError> {
        ManagedServer::halt(self, deadline).await
    }
}
