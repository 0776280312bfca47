//! Error types for EuroFX shared types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::Currency;

/// A string that is not a three-letter currency code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid currency code: {0:?}")]
pub struct CurrencyCodeError(pub String);

/// Errors raised while building a rate table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateTableError {
    /// Rates must be strictly positive.
    #[error("Rate for {currency} must be positive, got {rate}")]
    NonPositiveRate { currency: Currency, rate: Decimal },
}
