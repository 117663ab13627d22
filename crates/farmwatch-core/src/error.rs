//! Error types for farmwatch-core.
//!
//! # Error Handling Strategies
//!
//! | Error Type | Where it arises | What happens |
//! |------------|-----------------|--------------|
//! | [`Error::Unreachable`] | any fetch or command | Refresh cycle abandoned, prior view kept; commands report it once |
//! | [`Error::Http`] | decoding a response body | Same as `Unreachable` |
//! | [`Error::Api`] | a fetch answered non-2xx | Same as `Unreachable` |
//! | [`Error::Rejected`] | a control command answered non-2xx | Surfaced to the caller with the server text, never retried |
//! | [`Error::InvalidInterval`] | `set_interval` validation | Rejected locally, nothing is sent |
//! | [`Error::InvalidConfig`] | scheduler or client options | Fix configuration and restart |
//! | [`Error::Cancelled`] | scheduler teardown | Not an error condition for callers |
//!
//! Per-record data-quality problems are [`farmwatch_types::ParseError`]s; they
//! only ever exclude the offending record and are logged, not returned.

use thiserror::Error;

use farmwatch_types::ParseError;

/// Errors produced by the store client, dispatcher and scheduler.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The store or control plane could not be reached.
    #[error("Store not reachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request or response decoding failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A fetch endpoint answered with a non-success status.
    #[error("Store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The control plane refused a command. `reason` is the response body verbatim.
    #[error("Command rejected ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    /// Interval outside the allowed set; nothing was sent.
    #[error("Invalid interval: {0} seconds (allowed: 60, 300, 900, 1800, 3600)")]
    InvalidInterval(u32),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A record failed to parse where a single record was expected.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Operation was cancelled.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a rejection error from a status code and the raw response text.
    pub fn rejected(status: u16, reason: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            reason: reason.into(),
        }
    }

    /// Whether this error means the backend could not be talked to at all
    /// (as opposed to answering with a refusal).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::Http(_) | Self::Api { .. }
        )
    }
}

/// Result type alias using farmwatch-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_keeps_reason_verbatim() {
        let err = Error::rejected(502, "Failed to reach relay device");
        assert_eq!(
            err.to_string(),
            "Command rejected (502): Failed to reach relay device"
        );
        assert!(!err.is_transport());
    }

    #[test]
    fn test_invalid_interval_display() {
        let err = Error::InvalidInterval(120);
        assert!(err.to_string().contains("120 seconds"));
    }

    #[test]
    fn test_api_error_is_transport() {
        let err = Error::Api {
            status: 500,
            message: "boom".into(),
        };
        assert!(err.is_transport());
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: Error = ParseError::MissingField("device_id").into();
        assert!(matches!(err, Error::Parse(ParseError::MissingField(_))));
    }
}
