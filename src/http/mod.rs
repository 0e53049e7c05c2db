//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::listener accept)
//!     → server.rs (hyper auto builder, HTTP/1.1 or HTTP/2)
//!     → header read timeout (hyper timer)
//!     → request body / response timeouts (tower-http layers)
//!     → caller's axum Router
//!     → response written back, idle timer re-armed
//! ```

pub mod server;

pub use server::{HttpServer, ServerState};
