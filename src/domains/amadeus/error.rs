//! Amadeus client error types.

use thiserror::Error;

/// Errors that can occur while talking to the Amadeus API.
#[derive(Debug, Error)]
pub enum AmadeusError {
    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failure: missing credentials or a rejected token
    /// request.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The API answered with a non-success status.
    #[error("Amadeus API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl AmadeusError {
    /// Create an authentication error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }
}
