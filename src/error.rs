//! Error types and error handling for the dashboard
//!
//! `ApiError` is the single normalized error raised by the API client.
//! `AppError` is what the state store surfaces to its callers.

use thiserror::Error;

/// Errors raised by the remote API client
///
/// Retry decisions are made on the variant (and status code), never on the
/// rendered message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response reached the caller (DNS, refused connection, reset, ...)
    #[error("Network connectivity issue: {0}")]
    Network(String),

    /// The transport-level timeout elapsed before a response arrived
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Rate limited or server error, still failing after every retry
    #[error("Rate limited or server error (HTTP {status}) after {attempts} attempts: {body}")]
    RetriesExhausted {
        /// Status code of the last response
        status: u16,
        /// Total number of attempts made, including the first
        attempts: u32,
        /// Body of the last response
        body: String,
    },

    /// The remote service answered with an error status
    #[error("Retell API error (HTTP {status}): {body}")]
    Upstream {
        /// HTTP status code returned by the service
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A successful response whose body is not JSON at all
    ///
    /// Sits outside the network/upstream/exhausted kinds: retrying cannot
    /// fix a malformed body, so it fails after one attempt. A JSON body of
    /// an unexpected shape is not an error and normalizes to defaults.
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ApiError {
    /// Whether another attempt could succeed
    ///
    /// Network failures, timeouts, 429 and 5xx responses are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout(_) => true,
            ApiError::Upstream { status, .. } => is_retryable_status(*status),
            ApiError::RetriesExhausted { .. }
            | ApiError::InvalidResponse(_)
            | ApiError::Client(_) => false,
        }
    }

    /// HTTP status code carried by the error, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RetriesExhausted { status, .. } | ApiError::Upstream { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Convert the final error of a retried operation into its surfaced form
    ///
    /// Only throttled/server responses change shape; connectivity and
    /// timeout failures keep their own classification.
    pub(crate) fn into_exhausted(self, attempts: u32) -> Self {
        match self {
            ApiError::Upstream { status, body } if is_retryable_status(status) => {
                ApiError::RetriesExhausted {
                    status,
                    attempts,
                    body,
                }
            }
            other => other,
        }
    }
}

/// 429 and every 5xx are worth retrying
pub(crate) fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_builder() {
            ApiError::Client(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Errors surfaced by the application state store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The remote call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request was rejected before being sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
