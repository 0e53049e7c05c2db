//! TCP listener binding.
//!
//! # Responsibilities
//! - Normalize the configured address (`""`, `":port"`, `host:port`)
//! - Bind and report the resolved local address
//! - Classify accept errors as transient or fatal

use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::error::ServerError;

/// Address used when none is configured: every interface, system-assigned port.
pub const ANY_ADDRESS: &str = "0.0.0.0:0";

/// Expand the shorthand address forms into something `bind` accepts.
///
/// `""` binds every interface on an ephemeral port and `":8080"` binds every
/// interface on port 8080. Anything else is passed through unchanged.
pub fn normalize_address(address: &str) -> String {
    if address.is_empty() {
        ANY_ADDRESS.to_string()
    } else if let Some(port) = address.strip_prefix(':') {
        format!("0.0.0.0:{}", port)
    } else {
        address.to_string()
    }
}

/// Bind a listener on the configured address.
///
/// Returns the listener with its resolved local address, which differs from
/// the requested one when an ephemeral port was asked for.
pub async fn bind(address: &str) -> Result<(TcpListener, SocketAddr), ServerError> {
    let bind_err = |source: io::Error| ServerError::Bind {
        address: address.to_string(),
        source,
    };

    let listener = TcpListener::bind(normalize_address(address))
        .await
        .map_err(bind_err)?;
    let local_addr = listener.local_addr().map_err(bind_err)?;

    tracing::debug!(
        requested = %address,
        address = %local_addr,
        "Listener bound"
    );

    Ok((listener, local_addr))
}

/// Whether an accept error only affects one connection attempt.
///
/// Resource exhaustion and aborted handshakes do not invalidate the listener,
/// so the accept loop backs off and keeps going.
pub fn is_transient_accept_error(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    ) {
        return true;
    }

    // EMFILE, ENFILE, ENOBUFS, ENOMEM (Linux errno values)
    matches!(err.raw_os_error(), Some(23) | Some(24) | Some(105) | Some(12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_shorthand_addresses() {
        assert_eq!(normalize_address(""), "0.0.0.0:0");
        assert_eq!(normalize_address(":8080"), "0.0.0.0:8080");
        assert_eq!(normalize_address("127.0.0.1:0"), "127.0.0.1:0");
        assert_eq!(normalize_address("localhost:3000"), "localhost:3000");
    }

    #[tokio::test]
    async fn ephemeral_port_is_resolved() {
        let (_listener, addr) = bind("127.0.0.1:0").await.unwrap();
        assert_ne!(addr.port(), 0);
        assert!(addr.ip().is_loopback());
    }

    #[tokio::test]
    async fn taken_port_is_bind_error() {
        let (_first, addr) = bind("127.0.0.1:0").await.unwrap();
        let err = bind(&addr.to_string()).await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
    }

    #[tokio::test]
    async fn invalid_address_is_bind_error() {
        let err = bind("not an address").await.unwrap_err();
        match err {
            ServerError::Bind { address, .. } => assert_eq!(address, "not an address"),
            other => panic!("expected bind error, got {other:?}"),
        }
    }

    #[test]
    fn classifies_accept_errors() {
        assert!(is_transient_accept_error(&io::Error::from(io::ErrorKind::ConnectionAborted)));
        assert!(is_transient_accept_error(&io::Error::from_raw_os_error(24)));
        assert!(!is_transient_accept_error(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }
}
