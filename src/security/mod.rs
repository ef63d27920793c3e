//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (sliding-window check per client)
//!     → csrf.rs (token required on mutating routes)
//!     → validate.rs (description / id / filter checks, sanitization)
//! Outgoing response:
//!     → headers.rs (security response headers)
//! ```
//!
//! # Design Decisions
//! - Defense in depth: the regex denylist is best-effort; store-time
//!   HTML-escaping is the actual XSS boundary
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod csrf;
pub mod headers;
pub mod rate_limit;
pub mod validate;
