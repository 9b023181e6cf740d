//! Error types for the dispatch layer.

use thiserror::Error;

/// Result type alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that can occur between receiving a request and encoding its outcome.
///
/// None of these cross the HTTP boundary as a panic; each maps to a
/// well-formed response via [`DispatchError::status`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed parameters: {0}")]
    MalformedParameters(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl DispatchError {
    /// HTTP status code this error degrades to.
    pub fn status(&self) -> u16 {
        match self {
            Self::MalformedParameters(_) => 400,
            Self::PayloadTooLarge { .. } => 413,
            Self::Encoding(_) => 500,
        }
    }

    /// Message safe to show to the client.
    ///
    /// Encoding failures are internal, so the client only sees a generic text.
    pub fn client_message(&self) -> String {
        match self {
            Self::Encoding(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}
