//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, request ID, body limit, timeout,
//!   security headers, rate limiting)
//! - Serve with graceful shutdown
//! - Apply hot-reloaded configuration to the running service

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::handlers;
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;
use crate::security::csrf::CsrfProtect;
use crate::security::headers::security_headers_middleware;
use crate::security::rate_limit::{self, rate_limit_middleware, RateLimiter};
use crate::store::TaskStore;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TaskStore>,
    pub limiter: Arc<RateLimiter>,
    pub csrf: Arc<CsrfProtect>,
    pub config: Arc<ArcSwap<AppConfig>>,
}

/// HTTP server for the to-do service.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new((&config.rate_limit).into()));
        let csrf = Arc::new(CsrfProtect::new(&config.security.session_secret));

        let state = AppState {
            store: Arc::new(TaskStore::new()),
            limiter,
            csrf,
            config: Arc::new(ArcSwap::from_pointee(config)),
        };

        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The ServiceBuilder stack reads outermost-first. Order matters:
    /// security headers sit outside the rate limiter so even 429 responses
    /// carry them, and the request-id/trace layers wrap everything.
    fn build_router(state: AppState) -> Router {
        let config = state.config.load_full();

        Router::new()
            .route("/", get(handlers::index))
            .route("/add_task", post(handlers::add_task))
            .route("/toggle_task/{id}", post(handlers::toggle_task))
            .route("/delete_task/{id}", post(handlers::delete_task))
            .route("/get_tasks", get(handlers::get_tasks))
            .fallback(handlers::not_found)
            .with_state(state.clone())
            // Chained `Router::layer` applies the LAST call as the outermost
            // layer, so the calls below run bottom-to-top outermost-first to
            // preserve the intended stack order: security headers sit outside
            // the rate limiter so even 429 responses carry them, and the
            // request-id/trace layers wrap everything.
            .layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            ))
            .layer(middleware::from_fn(track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(middleware::from_fn_with_state(
                state,
                security_headers_middleware,
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<AppConfig>,
        shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let cleanup_interval = Duration::from_secs(
            self.state.config.load().rate_limit.cleanup_interval_secs,
        );
        rate_limit::spawn_cleanup(self.state.clone(), cleanup_interval, shutdown.clone());
        spawn_config_apply(self.state.clone(), config_updates, shutdown.clone());

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Last-resort 500: a panic below this layer becomes the fallback page
/// instead of tearing down the connection. No internal detail leaks.
fn handle_panic(
    _err: Box<dyn std::any::Any + Send + 'static>,
) -> axum::http::Response<axum::body::Body> {
    tracing::error!("Panic while handling request");

    axum::http::Response::builder()
        .status(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        .header(
            axum::http::header::CONTENT_TYPE,
            "text/html; charset=utf-8",
        )
        .body(axum::body::Body::from(crate::http::render::error_page(
            500,
            "An unexpected error occurred",
        )))
        .expect("static error response must build")
}

/// Record method/status/latency for every finished request.
async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

/// Apply hot-reloaded configurations to the running service.
///
/// The limiter picks up new limits immediately; middleware reads the
/// swapped config on the next request. The listener address, timeouts, and
/// body cap stay as they were at startup.
fn spawn_config_apply(
    state: AppState,
    mut updates: mpsc::UnboundedReceiver<AppConfig>,
    mut shutdown: ShutdownListener,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe = updates.recv() => match maybe {
                    Some(new_config) => {
                        state.limiter.update_config((&new_config.rate_limit).into());
                        state.config.store(Arc::new(new_config));
                        tracing::info!("Configuration reloaded");
                    }
                    None => break,
                },
                _ = shutdown.wait() => break,
            }
        }
    });
}

/// Resolve when either Ctrl+C arrives or shutdown is triggered.
async fn wait_for_shutdown(mut shutdown: ShutdownListener) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if result.is_ok() {
                tracing::info!("Ctrl+C received, shutting down");
            }
        }
        _ = shutdown.wait() => {
            tracing::info!("Shutdown triggered");
        }
    }
}
