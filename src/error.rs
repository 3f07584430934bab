//! Error types for influxdb-http.

use thiserror::Error;

/// Error type for influxdb-http operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied a value outside the recognized set.
    ///
    /// Raised before any request is sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The server answered with a non-success status.
    #[error("Request failed with status {status}: {body}")]
    RequestFailed {
        /// HTTP status code returned by the server.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A call that needs a single result got an empty result set.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body does not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// HTTP transport failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize a request body to JSON.
    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status of a `RequestFailed` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for influxdb-http operations.
pub type Result<T> = std::result::Result<T, Error>;
