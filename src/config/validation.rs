//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the bind address shape and port range
//! - Flag timeout combinations that can never be satisfied
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerSettings → Result<(), Vec<ValidationError>>
//! - Unset (zero) timeouts are valid; they are defaulted at construction

use crate::config::schema::ServerSettings;

/// A single semantic problem found in loaded settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address is not of the form `host:port` or `:port`.
    MalformedAddress(String),
    /// Port part does not parse as a 16-bit port number.
    InvalidPort(String),
    /// Header read timeout exceeds the full read timeout.
    HeaderTimeoutExceedsRead,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MalformedAddress(addr) => {
                write!(f, "address {:?} is not of the form host:port", addr)
            }
            ValidationError::InvalidPort(port) => write!(f, "invalid port {:?}", port),
            ValidationError::HeaderTimeoutExceedsRead => {
                write!(f, "read_header_ms must not exceed read_ms")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate loaded settings, collecting every problem.
pub fn validate_settings(settings: &ServerSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !settings.address.is_empty() {
        match settings.address.rsplit_once(':') {
            Some((_, port)) => {
                if port.parse::<u16>().is_err() {
                    errors.push(ValidationError::InvalidPort(port.to_string()));
                }
            }
            None => errors.push(ValidationError::MalformedAddress(settings.address.clone())),
        }
    }

    let timeouts = &settings.timeouts;
    if !timeouts.read.is_zero() && timeouts.read_header > timeouts.read {
        errors.push(ValidationError::HeaderTimeoutExceedsRead);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Timeouts;
    use std::time::Duration;

    fn settings(address: &str) -> ServerSettings {
        ServerSettings {
            address: address.to_string(),
            timeouts: Timeouts::default(),
        }
    }

    #[test]
    fn accepts_common_address_forms() {
        for addr in ["", ":8080", "127.0.0.1:0", "localhost:3000", "[::1]:443"] {
            assert!(validate_settings(&settings(addr)).is_ok(), "{addr} should be valid");
        }
    }

    #[test]
    fn reports_every_problem() {
        let mut bad = settings("127.0.0.1:99999");
        bad.timeouts.read = Duration::from_secs(1);
        bad.timeouts.read_header = Duration::from_secs(2);

        let errors = validate_settings(&bad).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidPort("99999".into()),
                ValidationError::HeaderTimeoutExceedsRead,
            ]
        );
    }

    #[test]
    fn rejects_address_without_port() {
        let errors = validate_settings(&settings("localhost")).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MalformedAddress("localhost".into())]);
    }
}
