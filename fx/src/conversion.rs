//! Currency conversion types.

use eurofx_common::{Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request to convert an amount between two currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
    /// Amount in source currency units.
    pub amount: Decimal,
}

impl ConversionRequest {
    /// Create a new conversion request.
    pub fn new(from: Currency, to: Currency, amount: Decimal) -> Self {
        Self { from, to, amount }
    }
}

/// Outcome of a conversion with its service fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionQuote {
    /// The request that produced this quote.
    pub request: ConversionRequest,
    /// Converted amount in the target currency, two decimal places.
    pub converted: Money,
    /// Requested amount expressed in the base currency, four decimal places.
    pub base_equivalent: Money,
    /// Fee charged in the base currency, two decimal places.
    pub fee: Money,
    /// Fee percentage applied, as a fraction.
    pub fee_percentage: Decimal,
}

impl ConversionQuote {
    /// Quote for an amount with nothing to convert.
    pub fn zero(request: ConversionRequest, base: Currency) -> Self {
        Self {
            converted: Money::zero(request.to.clone()),
            base_equivalent: Money::zero(base.clone()),
            fee: Money::zero(base),
            fee_percentage: Decimal::ZERO,
            request,
        }
    }

    /// Effective rate between source and target, before fees.
    pub fn effective_rate(&self) -> Decimal {
        if self.request.amount.is_zero() {
            return Decimal::ZERO;
        }
        self.converted.value / self.request.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_quote() {
        let request = ConversionRequest::new(Currency::usd(), Currency::gbp(), Decimal::ZERO);
        let quote = ConversionQuote::zero(request, Currency::eur());

        assert_eq!(quote.converted.to_string(), "0.00 GBP");
        assert_eq!(quote.fee.to_string(), "0.00 EUR");
        assert_eq!(quote.effective_rate(), Decimal::ZERO);
    }

    #[test]
    fn test_effective_rate() {
        let request = ConversionRequest::new(Currency::eur(), Currency::usd(), dec!(100));
        let quote = ConversionQuote {
            converted: Money::new(dec!(110), Currency::usd()),
            base_equivalent: Money::new(dec!(100), Currency::eur()),
            fee: Money::new(dec!(4), Currency::eur()),
            fee_percentage: dec!(0.04),
            request,
        };

        assert_eq!(quote.effective_rate(), dec!(1.1));
    }

    #[test]
    fn test_quote_serializes() {
        let request = ConversionRequest::new(Currency::eur(), Currency::usd(), dec!(100));
        let quote = ConversionQuote::zero(request, Currency::eur());
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["request"]["from"], "EUR");
        assert_eq!(json["converted"]["currency"], "USD");
    }
}
