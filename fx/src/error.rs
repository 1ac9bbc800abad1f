//! PTAX engine error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced to callers of the PTAX engine.
///
/// Transport failures, timeouts and empty feeds never appear here: the
/// resolution loop absorbs them and steps back a day instead.
#[derive(Debug, Error)]
pub enum PtaxError {
    /// No usable feed within the lookback window.
    #[error("No PTAX data available in the last {days} days")]
    DataUnavailable { days: u32 },

    /// Currency absent from the resolved rate set.
    #[error("Currency not found: {0}")]
    CurrencyNotFound(String),

    /// A zero rate would be used as a divisor.
    #[error("Invalid {currency} rate {rate}")]
    InvalidRate { currency: String, rate: Decimal },

    /// Converted amount exceeds the decimal range.
    #[error("Converting {amount} {from} to {to} overflows")]
    AmountOverflow {
        from: String,
        to: String,
        amount: Decimal,
    },
}

impl PtaxError {
    /// Stable code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            PtaxError::DataUnavailable { .. } => "DATA_UNAVAILABLE",
            PtaxError::CurrencyNotFound(_) => "CURRENCY_NOT_FOUND",
            PtaxError::InvalidRate { .. } => "INVALID_RATE",
            PtaxError::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
        }
    }
}

/// Result type for PTAX operations.
pub type PtaxResult<T> = Result<T, PtaxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_codes() {
        let err = PtaxError::DataUnavailable { days: 5 };
        assert_eq!(err.to_string(), "No PTAX data available in the last 5 days");
        assert_eq!(err.error_code(), "DATA_UNAVAILABLE");

        let err = PtaxError::CurrencyNotFound("XYZ".to_string());
        assert_eq!(err.to_string(), "Currency not found: XYZ");
        assert_eq!(err.error_code(), "CURRENCY_NOT_FOUND");

        let err = PtaxError::AmountOverflow {
            from: "BRL".to_string(),
            to: "JPY".to_string(),
            amount: Decimal::MAX,
        };
        assert_eq!(err.error_code(), "AMOUNT_OVERFLOW");
        assert!(err.to_string().ends_with("BRL to JPY overflows"));
    }
}
