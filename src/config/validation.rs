//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees. Returns every
//! violation found, not just the first.

use std::net::SocketAddr;

use crate::config::schema::{AppConfig, DEV_SESSION_SECRET};

/// Shortest session secret accepted for CSRF token signing.
const MIN_SECRET_LEN: usize = 16;

/// A single semantic violation in a configuration.
#[derive(Debug)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration before it is accepted into the system.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a valid socket address: {}", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::new("rate_limit.max_requests", "must be > 0"));
        }
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError::new("rate_limit.window_secs", "must be > 0"));
        }
        if config.rate_limit.cleanup_interval_secs == 0 {
            errors.push(ValidationError::new(
                "rate_limit.cleanup_interval_secs",
                "must be > 0",
            ));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if config.security.session_secret.len() < MIN_SECRET_LEN {
        errors.push(ValidationError::new(
            "security.session_secret",
            format!("must be at least {} characters", MIN_SECRET_LEN),
        ));
    }

    // The shipped fallback secret is only tolerated in debug builds.
    if !cfg!(debug_assertions) && config.security.session_secret == DEV_SESSION_SECRET {
        errors.push(ValidationError::new(
            "security.session_secret",
            "the built-in development secret is not allowed in release builds; set SESSION_SECRET",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a valid socket address: {}", config.observability.metrics_address),
        ));
    }

    match config.observability.log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level: {}", other),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
