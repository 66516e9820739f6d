use serde::Serialize;
use thiserror::Error;

/// Unified error type for fill requests.
///
/// None of these are retried. A failed load leaves the target control with the options it
/// had before the request; the error is logged and handed back through
/// [`LoadOutcome::Failed`](crate::LoadOutcome::Failed).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum LoadError {
    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status} {status_text}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Numeric HTTP status.
        status: u16,
        /// Canonical reason phrase, empty when unknown.
        status_text: String,
    },

    /// Connection refused, DNS failure, body read failure and similar.
    #[error("Network error for {url}: {detail}")]
    Network {
        /// Requested URL.
        url: String,
        /// Error details.
        detail: String,
    },

    /// The transport gave up waiting for the server.
    #[error("Request to {url} timed out: {detail}")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Error details.
        detail: String,
    },

    /// The response body is not a `{ "values": [...] }` document.
    #[error("Failed to parse response from {url}: {detail}")]
    Parse {
        /// Requested URL.
        url: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// The loader configuration cannot be used as-is.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The form has no select control with this field id.
    #[error("No select control for field '{0}'")]
    UnknownField(String),

    /// The background task running a load panicked or was cancelled.
    #[error("Load task failed: {0}")]
    TaskFailed(String),
}

impl LoadError {
    /// Whether the failure came from the remote side (status, network, timeout, body).
    ///
    /// Used to pick the log level: remote failures are `warn`, local misuse is `error`.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { .. }
                | Self::Network { .. }
                | Self::Timeout { .. }
                | Self::Parse { .. }
        )
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LoadError>;
