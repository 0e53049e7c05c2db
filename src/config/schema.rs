//! Configuration schema definitions.
//!
//! This module defines the server configuration and the production timeout
//! defaults. `ServerSettings` is the file-loadable subset; `ServerConfig`
//! adds the request handler, which cannot come from a file.

use std::time::Duration;

use axum::Router;
use serde::{Deserialize, Serialize};

/// Default idle (keep-alive) timeout.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default response write timeout.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request header read timeout.
pub const DEFAULT_READ_HEADER_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-connection time limits.
///
/// A zero duration means "not set"; [`Timeouts::or_defaults`] replaces every
/// unset field with its `DEFAULT_*` constant. `Timeouts::default()` is the
/// all-unset value, not the production defaults (see [`Timeouts::PRODUCTION`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Timeouts {
    /// Bound on waiting for request body data.
    #[serde(rename = "read_ms", with = "duration_ms")]
    pub read: Duration,

    /// Bound on reading the request head.
    #[serde(rename = "read_header_ms", with = "duration_ms")]
    pub read_header: Duration,

    /// Bound on producing and writing the response.
    #[serde(rename = "write_ms", with = "duration_ms")]
    pub write: Duration,

    /// Bound on keep-alive inactivity between requests.
    #[serde(rename = "idle_ms", with = "duration_ms")]
    pub idle: Duration,
}

impl Timeouts {
    /// The documented production defaults.
    pub const PRODUCTION: Timeouts = Timeouts {
        read: DEFAULT_READ_TIMEOUT,
        read_header: DEFAULT_READ_HEADER_TIMEOUT,
        write: DEFAULT_WRITE_TIMEOUT,
        idle: DEFAULT_IDLE_TIMEOUT,
    };

    /// Replace each unset (zero) field with its default, keeping explicit values.
    ///
    /// Fields are resolved independently of one another.
    pub fn or_defaults(self) -> Self {
        fn pick(explicit: Duration, default: Duration) -> Duration {
            if explicit.is_zero() {
                default
            } else {
                explicit
            }
        }

        Self {
            read: pick(self.read, DEFAULT_READ_TIMEOUT),
            read_header: pick(self.read_header, DEFAULT_READ_HEADER_TIMEOUT),
            write: pick(self.write, DEFAULT_WRITE_TIMEOUT),
            idle: pick(self.idle, DEFAULT_IDLE_TIMEOUT),
        }
    }

    /// True when every field is bounded.
    pub fn is_bounded(&self) -> bool {
        !(self.read.is_zero()
            || self.read_header.is_zero()
            || self.write.is_zero()
            || self.idle.is_zero())
    }
}

/// File-loadable server settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address (e.g., "127.0.0.1:8080", ":8080"). Empty means any
    /// interface on a system-assigned port.
    pub address: String,

    /// Per-connection timeouts; zero fields take the defaults.
    pub timeouts: Timeouts,
}

/// Configuration for a managed HTTP server.
///
/// Build one with struct-update syntax over `Default` and hand it to
/// [`ManagedServer::new`](crate::ManagedServer::new), which fills unset
/// timeouts with the defaults.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Network address to bind.
    pub address: String,

    /// Request handler. The default router answers 404 to everything.
    pub handler: Router,

    /// Per-connection timeouts.
    pub timeouts: Timeouts,
}

impl ServerConfig {
    /// Build a config from loaded settings and a handler.
    pub fn from_settings(settings: ServerSettings, handler: Router) -> Self {
        Self {
            address: settings.address,
            handler,
            timeouts: settings.timeouts,
        }
    }

    /// Resolve an optional caller config into one with every timeout set.
    ///
    /// `None` yields a fresh all-defaults config.
    pub fn resolve(config: Option<ServerConfig>) -> Self {
        let mut config = config.unwrap_or_default();
        config.timeouts = config.timeouts.or_defaults();
        config
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
