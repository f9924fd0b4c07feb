//! # Photo Dedup Engine
//!
//! Finds duplicate photos and burst sequences from perceptual fingerprints.
//!
//! ## Core Philosophy
//! - **Never hide silently** - Every suppressed photo points at the
//!   representative that stands in for it
//! - **Partial data is normal** - Records missing a fingerprint or timestamp
//!   are excluded from a pass and reported, never failed
//! - **Deterministic** - The same records always give the same groups
//!
//! ## Architecture
//! - `core` - The detection engine (no I/O)
//! - `error` - Error types
//!
//! The `photo-groups` binary wraps the engine with a JSON-in command line.

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use error::{DetectorError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the library
///
/// Logs go to stderr so stdout stays free for results. `RUST_LOG` takes
/// precedence over `verbose`. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
