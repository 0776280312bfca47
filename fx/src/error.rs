//! FX engine error types.

use eurofx_common::Currency;
use thiserror::Error;

/// Errors that can occur while fetching rates or converting amounts.
#[derive(Debug, Error)]
pub enum FxError {
    /// Currency code not present in the rate table.
    #[error("Invalid currency code provided: {0}")]
    InvalidCurrency(String),

    /// Source currency has a zero rate and cannot be divided by.
    #[error("Exchange rate for {0} is zero.")]
    ZeroRate(Currency),

    /// Transport failure talking to the rate feed.
    #[error("Network error: {0}")]
    Network(String),

    /// Rate feed answered with a non-success status.
    #[error("Rate feed returned HTTP {0}")]
    HttpStatus(u16),

    /// Rate feed body could not be parsed.
    #[error("Failed to parse rate feed: {0}")]
    Parse(String),

    /// Arithmetic left the representable decimal range.
    #[error("Amount is out of range")]
    AmountOutOfRange,
}

impl FxError {
    /// Check if this error came from retrieving or parsing the rate feed.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            FxError::Network(_) | FxError::HttpStatus(_) | FxError::Parse(_)
        )
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
