//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Built-in development session secret.
///
/// Accepted only in debug builds; `validation.rs` rejects it in release
/// builds so a deployment cannot run with a guessable signing key.
pub const DEV_SESSION_SECRET: &str = "dev-secret-key-change-in-production";

/// Root configuration for the to-do service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Per-client rate limiting.
    pub rate_limit: RateLimitSettings,

    /// Security hardening (headers, body cap, session secret).
    pub security: SecuritySettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Sliding-window rate limit settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per client within the window.
    pub max_requests: usize,

    /// Trailing window length in seconds.
    pub window_secs: u64,

    /// Interval between evictions of idle client buckets, in seconds.
    pub cleanup_interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 3600,
            cleanup_interval_secs: 300,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Stamp security response headers on every response.
    pub enable_headers: bool,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Secret for CSRF token signing. Overridden by the `SESSION_SECRET`
    /// environment variable when set.
    pub session_secret: String,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 1024 * 1024, // 1MB
            session_secret: DEV_SESSION_SECRET.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
