//! Sliding-window rate limiting middleware.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::config::schema::RateLimitSettings;
use crate::error::AppError;
use crate::http::server::AppState;
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;
use crate::security::validate::client_ip;

/// Active limits, swappable at runtime via config reload.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            max_requests: settings.max_requests,
            window: Duration::from_secs(settings.window_secs),
        }
    }
}

/// Request timestamps for one client inside the trailing window.
#[derive(Debug, Default)]
struct ClientBucket {
    timestamps: Vec<Instant>,
}

impl ClientBucket {
    fn purge(&mut self, now: Instant, window: Duration) {
        self.timestamps.retain(|&t| now.duration_since(t) < window);
    }
}

struct LimiterState {
    config: RateLimitConfig,
    clients: HashMap<String, ClientBucket>,
}

/// Per-client sliding-window request counter.
///
/// One lock guards the whole map so the purge-count-append sequence is
/// atomic with respect to concurrent requests from the same client.
pub struct RateLimiter {
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            state: Mutex::new(LimiterState {
                config,
                clients: HashMap::new(),
            }),
        }
    }

    /// Purge stale timestamps, then admit and record the request unless the
    /// client is already at the limit.
    pub fn is_allowed(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        let config = state.config;

        let bucket = state.clients.entry(client.to_string()).or_default();
        bucket.purge(now, config.window);

        if bucket.timestamps.len() >= config.max_requests {
            return false;
        }

        bucket.timestamps.push(now);
        true
    }

    /// How many requests the client has left in the current window.
    /// Does not record a request.
    pub fn remaining_requests(&self, client: &str) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        let config = state.config;

        match state.clients.get_mut(client) {
            Some(bucket) => {
                bucket.purge(now, config.window);
                config.max_requests.saturating_sub(bucket.timestamps.len())
            }
            None => config.max_requests,
        }
    }

    /// Drop clients with no requests inside the window, bounding the map.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        let window = state.config.window;

        state.clients.retain(|_, bucket| {
            bucket.purge(now, window);
            !bucket.timestamps.is_empty()
        });
    }

    /// Apply new limits. Existing timestamps are kept and re-judged against
    /// the new window on the next check.
    pub fn update_config(&self, config: RateLimitConfig) {
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        state.config = config;
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.state
            .lock()
            .expect("rate limiter mutex poisoned")
            .clients
            .len()
    }
}

/// Spawn the periodic eviction task for idle client buckets.
pub fn spawn_cleanup(
    state: AppState,
    interval: Duration,
    mut shutdown: ShutdownListener,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    state.limiter.cleanup();
                    tracing::debug!("Rate limiter cleanup pass complete");
                }
                _ = shutdown.wait() => break,
            }
        }
    })
}

/// Middleware admitting or rejecting every request before it reaches a
/// handler. Rejections carry a JSON error body and a 429 status.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.load().rate_limit.enabled {
        return next.run(request).await;
    }

    let client = client_ip(request.headers(), addr);
    if state.limiter.is_allowed(&client) {
        next.run(request).await
    } else {
        tracing::warn!(client = %client, "Rate limit exceeded");
        metrics::record_rate_limited();
        AppError::RateLimit.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: usize, window: Duration) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window,
        })
    }

    #[test]
    fn third_request_in_window_is_refused() {
        let limiter = limiter(2, Duration::from_secs(60));

        assert!(limiter.is_allowed("ip1"));
        assert!(limiter.is_allowed("ip1"));
        assert!(!limiter.is_allowed("ip1"));
        // Other clients are unaffected.
        assert!(limiter.is_allowed("ip2"));
    }

    #[test]
    fn window_expiry_readmits_the_client() {
        let limiter = limiter(2, Duration::from_millis(50));

        assert!(limiter.is_allowed("ip1"));
        assert!(limiter.is_allowed("ip1"));
        assert!(!limiter.is_allowed("ip1"));

        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.is_allowed("ip1"));
    }

    #[test]
    fn remaining_does_not_record() {
        let limiter = limiter(5, Duration::from_secs(60));

        assert_eq!(limiter.remaining_requests("ip1"), 5);
        assert_eq!(limiter.remaining_requests("ip1"), 5);

        assert!(limiter.is_allowed("ip1"));
        assert_eq!(limiter.remaining_requests("ip1"), 4);
    }

    #[test]
    fn cleanup_evicts_idle_clients() {
        let limiter = limiter(5, Duration::from_millis(20));

        assert!(limiter.is_allowed("ip1"));
        assert!(limiter.is_allowed("ip2"));
        assert_eq!(limiter.tracked_clients(), 2);

        std::thread::sleep(Duration::from_millis(30));
        limiter.cleanup();
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn config_update_applies_to_live_buckets() {
        let limiter = limiter(1, Duration::from_secs(60));
        assert!(limiter.is_allowed("ip1"));
        assert!(!limiter.is_allowed("ip1"));

        limiter.update_config(RateLimitConfig {
            max_requests: 3,
            window: Duration::from_secs(60),
        });
        assert!(limiter.is_allowed("ip1"));
    }
}
