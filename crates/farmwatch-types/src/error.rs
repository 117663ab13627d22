//! Error types for record parsing in farmwatch-types.

use thiserror::Error;

/// Errors that can occur when turning wire records into domain values.
///
/// These are data-quality errors: each one disqualifies a single record and
/// is never fatal to a refresh cycle.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A required field was absent or empty.
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// A timestamp could not be parsed.
    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    /// An interval value is not positive or not in the allowed set.
    #[error("Invalid interval: {0} seconds")]
    InvalidInterval(i64),

    /// A relay action other than `on`/`off`.
    #[error("Invalid relay action '{0}' (expected 'on' or 'off')")]
    InvalidRelayAction(String),

    /// An axis granularity selection could not be parsed.
    #[error("Invalid axis granularity '{0}'")]
    InvalidGranularity(String),
}

/// Result type alias using farmwatch-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
