//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the configured session secret.
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";

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
///
/// The `SESSION_SECRET` environment variable, when present and non-empty,
/// replaces whatever secret the file carries.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: AppConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the default configuration, with environment overrides applied.
pub fn default_config() -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::default();

    apply_env(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env(config: &mut AppConfig) {
    if let Ok(secret) = env::var(SESSION_SECRET_ENV) {
        if !secret.is_empty() {
            config.security.session_secret = secret;
        }
    }
}
