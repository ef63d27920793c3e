//! HTTP surface of the to-do service.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware wiring)
//!     → rate limit / security header middleware (security subsystem)
//!     → handlers.rs (CSRF check, validation, store access)
//!     → render.rs (HTML page) or JSON body
//!     → flash.rs (one-shot notices across redirects)
//! ```

pub mod flash;
pub mod handlers;
pub mod render;
pub mod server;

pub use server::{AppState, HttpServer};
