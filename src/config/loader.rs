//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

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

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: AppConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses() {
        let config: AppConfig = toml::from_str(
            r#"
            [http]
            enforce_https = true
            canonical_host = "openvj.org"

            [[routes]]
            methods = ["GET"]
            path = "/user/{id}"
            controller = "user:show"
            "#,
        )
        .unwrap();
        assert!(config.http.enforce_https);
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.session.cookie_name, "VJID");
        assert!(config.mongodb.is_none());
    }

    #[test]
    fn test_mongodb_section_optional_fields() {
        let config: AppConfig = toml::from_str(
            r#"
            [mongodb]
            uri = "mongodb://localhost:27017"
            database = "vj"
            "#,
        )
        .unwrap();
        let mongo = config.mongodb.unwrap();
        assert_eq!(mongo.database, "vj");
        assert_eq!(mongo.connect_timeout_ms, 3_000);
    }
}
