//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! caller-built ServerConfig            config file (TOML)
//!     │                                    → loader.rs (parse & deserialize)
//!     │                                    → validation.rs (semantic checks)
//!     │                                    → ServerSettings + handler
//!     ▼                                          │
//! schema.rs: ServerConfig::resolve  ◀────────────┘
//!     → every unset timeout replaced by its default
//!     → owned by the ManagedServer for its lifetime
//! ```
//!
//! # Design Decisions
//! - Zero timeout means "unset"; defaulting is per field
//! - Defaulting happens before options run and options never touch timeouts
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, ConfigError};
pub use schema::{
    ServerConfig, ServerSettings, Timeouts, DEFAULT_IDLE_TIMEOUT, DEFAULT_READ_HEADER_TIMEOUT,
    DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT,
};
