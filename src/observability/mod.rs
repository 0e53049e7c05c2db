//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ManagedServer announcements (bound address, shutdown)
//!     → logging.rs Logger capability (stderr by default, injectable)
//!
//! HttpServer lifecycle and connection events
//!     → tracing events (bound, draining, drained, forced close, accept errors)
//!     → tracing-subscriber (initialized by the binary)
//! ```

pub mod logging;

pub use logging::{init_tracing, Logger, StderrLogger, TracingLogger};
