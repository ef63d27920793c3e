//! Shared utilities for integration tests.

use std::net::SocketAddr;

use tokio::sync::mpsc;

use todo_service::config::AppConfig;
use todo_service::http::HttpServer;
use todo_service::lifecycle::Shutdown;

/// Test configuration: ephemeral port, generous rate limit, metrics off.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.rate_limit.max_requests = 10_000;
    config.observability.metrics_enabled = false;
    config
}

/// Bind an ephemeral port and spawn the server on it.
///
/// The listener is bound before the task is spawned, so requests sent
/// immediately after return will be accepted.
pub async fn spawn_server(config: AppConfig) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind(&config.listener.bind_address)
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    let shutdown = Shutdown::new();
    let (_config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.listener();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build http client")
}

/// Pull the CSRF token out of a rendered page.
pub fn extract_csrf_token(page: &str) -> String {
    let marker = "name=\"csrf_token\" value=\"";
    let start = page.find(marker).expect("page must embed a CSRF token") + marker.len();
    let rest = &page[start..];
    let end = rest.find('"').expect("unterminated token attribute");
    rest[..end].to_string()
}

/// Fetch the listing page and return a fresh CSRF token.
pub async fn fetch_csrf_token(client: &reqwest::Client, addr: SocketAddr) -> String {
    let page = client
        .get(format!("http://{}/", addr))
        .send()
        .await
        .expect("GET /")
        .text()
        .await
        .expect("page body");
    extract_csrf_token(&page)
}
