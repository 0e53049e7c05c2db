//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured address
//!     → listener.rs (normalize, bind, resolve local address)
//!     → accept loop in http::server
//!     → connection.rs (live-connection tracking, idle activity)
//!     → Hand off to hyper
//! ```
//!
//! # Design Decisions
//! - Each connection tracked for graceful shutdown
//! - Transient accept errors never stop the listener

pub mod connection;
pub mod listener;
