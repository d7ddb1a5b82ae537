//! Error types for the operator console
//!
//! Uses thiserror for ergonomic error definitions.
//! Handlers turn these into JSON bodies; nothing here panics.

use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Operator console errors
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP errors (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Backend answered with a non-2xx status
    #[error("Backend error: HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered 2xx with something that is not the expected shape
    #[error("Unexpected backend response: {0}")]
    InvalidResponse(String),

    /// Analytics payload unusable as a whole
    #[error("Invalid analytics payload: {0}")]
    InvalidPayload(String),

    /// Trade id rejected before reaching the backend
    #[error("Invalid trade id: {0:?}")]
    InvalidTradeId(String),

    /// Worker runtime errors
    #[error("Worker error: {0}")]
    Worker(String),
}

impl ConsoleError {
    /// HTTP status the console should answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ConsoleError::InvalidTradeId(_) => 400,
            ConsoleError::Http(_)
            | ConsoleError::Backend { .. }
            | ConsoleError::Json(_)
            | ConsoleError::InvalidResponse(_)
            | ConsoleError::InvalidPayload(_) => 502,
            ConsoleError::Config(_) | ConsoleError::Worker(_) => 500,
        }
    }
}

impl From<worker::Error> for ConsoleError {
    fn from(err: worker::Error) -> Self {
        ConsoleError::Worker(err.to_string())
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        ConsoleError::Http(err.to_string())
    }
}

impl From<ConsoleError> for worker::Error {
    fn from(err: ConsoleError) -> Self {
        worker::Error::RustError(err.to_string())
    }
}
