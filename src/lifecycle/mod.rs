//! Lifecycle management subsystem.
//!
//! Startup is ordered in `main.rs` (config → logging → metrics → listener);
//! this module owns the shutdown side: one coordinator fans a stop signal
//! out to the server loop and its background tasks.

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownListener};
