//! Error types and handling for fathom core

use thiserror::Error;

/// Result type alias for fathom operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fathom core
#[derive(Error, Debug)]
pub enum Error {
    /// Settings-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An external program could not be started
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external program exited unsuccessfully
    #[error("Command '{program}' failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// An external program did not finish in time
    #[error("Command '{program}' timed out after {seconds} seconds")]
    Timeout { program: String, seconds: u64 },

    /// The throttler replaced this call with a newer one
    #[error("Request superseded by a newer call")]
    Superseded,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Settings validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

impl Error {
    /// Whether this error only means the call was coalesced away
    pub fn is_superseded(&self) -> bool {
        matches!(self, Error::Superseded)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
