//! Security response headers.
//!
//! Every response leaving the service is stamped with a fixed header set:
//! XSS/sniffing/framing protections, a content security policy, and
//! cache-disabling headers. The page embeds an inline stylesheet and
//! script, hence `'unsafe-inline'` in the policy.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     style-src 'self' 'unsafe-inline'; \
     script-src 'self' 'unsafe-inline'; \
     font-src 'self'; \
     img-src 'self' data:; \
     connect-src 'self'; \
     frame-ancestors 'none';";

/// Middleware stamping the security header set on outgoing responses.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let enabled = state.config.load().security.enable_headers;
    let mut response = next.run(request).await;

    if enabled {
        apply_headers(response.headers_mut());
    }
    response
}

fn apply_headers(headers: &mut HeaderMap) {
    headers.insert("x-xss-protection", HeaderValue::from_static("1; mode=block"));
    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "permissions-policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );

    // Everything this service serves is dynamic; disable caching outright.
    headers.insert(
        "cache-control",
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert("pragma", HeaderValue::from_static("no-cache"));
    headers.insert("expires", HeaderValue::from_static("0"));
}
