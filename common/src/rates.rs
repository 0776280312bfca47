//! Base-relative exchange rate tables.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::RateTableError;
use crate::Currency;

/// Snapshot of rates expressed as units of each currency per one unit of
/// the base currency.
///
/// The base currency is always present with a rate of exactly one and every
/// rate is strictly positive. Tables are only built through
/// [`RateTableBuilder`] and cannot be modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateTable {
    base: Currency,
    rates: HashMap<Currency, Decimal>,
    as_of: Option<NaiveDate>,
}

impl RateTable {
    /// Start building a table for the given base currency.
    pub fn builder(base: Currency) -> RateTableBuilder {
        RateTableBuilder::new(base)
    }

    /// Build a table from `(currency, rate)` pairs.
    pub fn from_rates<I>(base: Currency, rates: I) -> Result<Self, RateTableError>
    where
        I: IntoIterator<Item = (Currency, Decimal)>,
    {
        let mut builder = RateTableBuilder::new(base);
        for (currency, rate) in rates {
            builder.insert(currency, rate)?;
        }
        Ok(builder.build())
    }

    /// The base currency of this table.
    pub fn base(&self) -> &Currency {
        &self.base
    }

    /// Check whether a currency is the base currency.
    pub fn is_base(&self, currency: &Currency) -> bool {
        &self.base == currency
    }

    /// Rate for a currency, if present.
    pub fn rate(&self, currency: &Currency) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    /// Check if the table contains a currency.
    pub fn contains(&self, currency: &Currency) -> bool {
        self.rates.contains_key(currency)
    }

    /// Publication date reported by the feed, if any.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    /// Number of currencies, base included.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Always false for a built table since the base currency is present.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Currency codes sorted alphabetically.
    pub fn sorted_currencies(&self) -> Vec<&Currency> {
        let mut currencies: Vec<&Currency> = self.rates.keys().collect();
        currencies.sort();
        currencies
    }
}

/// Accumulates rates and enforces the table invariants.
#[derive(Debug, Clone)]
pub struct RateTableBuilder {
    base: Currency,
    rates: HashMap<Currency, Decimal>,
    as_of: Option<NaiveDate>,
}

impl RateTableBuilder {
    /// Create an empty builder.
    pub fn new(base: Currency) -> Self {
        Self {
            base,
            rates: HashMap::new(),
            as_of: None,
        }
    }

    /// Add or replace a rate. Zero and negative rates are rejected.
    pub fn insert(&mut self, currency: Currency, rate: Decimal) -> Result<&mut Self, RateTableError> {
        if rate <= Decimal::ZERO {
            return Err(RateTableError::NonPositiveRate { currency, rate });
        }
        self.rates.insert(currency, rate);
        Ok(self)
    }

    /// Record the publication date.
    pub fn as_of(&mut self, date: NaiveDate) -> &mut Self {
        self.as_of = Some(date);
        self
    }

    /// Number of rates collected so far.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Check if no rates have been collected.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Finish the table. The base currency is set to one, replacing any
    /// rate the caller supplied for it.
    pub fn build(self) -> RateTable {
        let mut rates = self.rates;
        rates.insert(self.base.clone(), Decimal::ONE);
        RateTable {
            base: self.base,
            rates,
            as_of: self.as_of,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_table() -> RateTable {
        RateTable::from_rates(
            Currency::eur(),
            [(Currency::usd(), dec!(1.1)), (Currency::gbp(), dec!(0.9))],
        )
        .unwrap()
    }

    #[test]
    fn test_base_always_present() {
        let table = RateTable::builder(Currency::eur()).build();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rate(&Currency::eur()), Some(Decimal::ONE));
        assert!(!table.is_empty());
    }

    #[test]
    fn test_base_rate_overwritten() {
        let mut builder = RateTable::builder(Currency::eur());
        builder.insert(Currency::eur(), dec!(1.5)).unwrap();
        let table = builder.build();

        assert_eq!(table.rate(&Currency::eur()), Some(Decimal::ONE));
    }

    #[test]
    fn test_non_positive_rates_rejected() {
        let mut builder = RateTable::builder(Currency::eur());
        assert!(builder.insert(Currency::usd(), Decimal::ZERO).is_err());
        assert!(builder.insert(Currency::gbp(), dec!(-0.5)).is_err());
        assert!(builder.is_empty());

        let table = builder.build();
        assert!(!table.contains(&Currency::usd()));
        assert!(!table.contains(&Currency::gbp()));
    }

    #[test]
    fn test_lookup() {
        let table = sample_table();
        assert_eq!(table.rate(&Currency::usd()), Some(dec!(1.1)));
        assert_eq!(table.rate(&Currency::jpy()), None);
        assert!(table.is_base(&Currency::eur()));
        assert!(!table.is_base(&Currency::usd()));
    }

    #[test]
    fn test_sorted_currencies() {
        let table = sample_table();
        let codes: Vec<&str> = table.sorted_currencies().iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec!["EUR", "GBP", "USD"]);
    }

    #[test]
    fn test_as_of_recorded() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let mut builder = RateTable::builder(Currency::eur());
        builder.as_of(date);
        assert_eq!(builder.build().as_of(), Some(date));
    }
}
