//! Managed HTTP server lifecycle.
//!
//! Wraps a hyper-based HTTP server so that it never runs with unbounded
//! read, read-header, write or idle timeouts, and exposes the same
//! run/halt contract as any other supervised component.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::{ServerConfig, ServerSettings, Timeouts};
pub use error::ServerError;
pub use http::{HttpServer, ServerState};
pub use lifecycle::{with_logger, Component, ManagedServer, ServerOption};
pub use observability::{Logger, StderrLogger, TracingLogger};
