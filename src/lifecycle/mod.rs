//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Construction (managed.rs, options.rs):
//!     Option<ServerConfig> → default unset timeouts → apply options in order
//!
//! Run:   bind → announce address → serve (blocks)
//! Halt:  announce → stop accepting → drain → Stopped
//!        deadline first → force-close → ShutdownTimeout
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → binary calls halt
//! ```
//!
//! # Design Decisions
//! - Timeouts are fixed before options run; options never touch them
//! - Shutdown has a deadline: it never hangs
//! - Halt before run is a no-op; a later run still starts

pub mod component;
pub mod managed;
pub mod options;
pub mod signals;

pub use component::Component;
pub use managed::ManagedServer;
pub use options::{with_logger, Options, ServerOption};
