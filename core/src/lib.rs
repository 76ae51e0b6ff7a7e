//! # fathom Core
//!
//! Core library for fathom - incremental project search for editor hosts.
//!
//! This library runs full-text searches through a streaming ripgrep process,
//! enumerates files by name or path, keeps a fuzzy index over the tracked files
//! of one working tree, and coalesces bursts of requests per entry point.

// Core modules
pub mod config;
pub mod error;
pub mod process;
pub mod search;
pub mod service;
pub mod throttle;

// Re-export commonly used types
pub use config::{FuzzyOptions, ScanTool, SearchSettings};
pub use error::{ConfigError, Error, Result};
pub use search::{ContentQuery, FileQuery, MatchRecord, Submatch};
pub use service::SearchService;
pub use throttle::{Throttle, ThrottledCall};

/// Current version of the fathom-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}
