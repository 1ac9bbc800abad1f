//! Error types for parsing PTAX values.

use thiserror::Error;

/// Errors raised when a textual PTAX value cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Date not in `DD/MM/YYYY` form or not a real calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Currency kind other than `A` or `B`.
    #[error("Invalid currency kind: {0}")]
    InvalidCurrencyKind(String),

    /// Rate kind other than `buy` or `sell`.
    #[error("Invalid rate kind: {0}")]
    InvalidRateKind(String),
}

/// Result type alias for parsing operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
