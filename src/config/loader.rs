//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServerSettings;
use crate::config::validation::{validate_settings, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate server settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<ServerSettings, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let settings: ServerSettings = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_settings(&settings).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), address = %settings.address, "Settings loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_file() {
        let file = write_config(
            r#"
            address = ":8080"

            [timeouts]
            write_ms = 750
            "#,
        );

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.address, ":8080");
        assert_eq!(settings.timeouts.write, Duration::from_millis(750));
        assert!(settings.timeouts.read.is_zero());
    }

    #[test]
    fn empty_file_is_all_unset() {
        let file = write_config("");
        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings, ServerSettings::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_settings(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn bad_syntax_is_parse_error() {
        let file = write_config("address = ");
        assert!(matches!(load_settings(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn semantic_errors_are_reported() {
        let file = write_config(r#"address = "nowhere""#);
        match load_settings(file.path()) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
