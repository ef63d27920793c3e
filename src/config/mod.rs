//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply SESSION_SECRET env override)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated)
//!     → shared via Arc<ArcSwap> to handlers and middleware
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap observed by middleware on the next request
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the service runs with no config file
//! - The session secret never lives in the TOML-visible schema defaults
//!   for production: the insecure fallback is rejected in release builds
//! - Validation returns all errors, not just the first

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::AppConfig;
pub use schema::ListenerConfig;
pub use schema::RateLimitSettings;
pub use schema::SecuritySettings;
