//! Conversion form: validates user input, runs the engine and renders the
//! labels shown to the user.

use std::str::FromStr;

use eurofx_common::{Currency, Money, RateTable};
use eurofx_fx::{ConversionEngine, ConversionQuote, ConversionRequest, FxError};
use rust_decimal::Decimal;
use tracing::error;

pub const MSG_INCOMPLETE: &str = "Please select currencies and enter an amount.";
pub const MSG_RATES_UNAVAILABLE: &str = "Exchange rates not available. Cannot perform conversion.";
pub const MSG_INVALID_AMOUNT: &str = "Invalid amount format. Please enter a number.";
pub const MSG_NEGATIVE_AMOUNT: &str = "Amount cannot be negative.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred during conversion.";

/// Labels produced by one form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOutcome {
    /// Converted amount label, e.g. `110.00 USD`.
    pub converted: String,
    /// Fee label, e.g. `4.00 EUR`.
    pub fee: String,
    /// Error message, if the submission failed.
    pub error: Option<String>,
    /// The quote behind the labels on success.
    pub quote: Option<ConversionQuote>,
}

impl FormOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            converted: "0.00".to_string(),
            fee: Money::zero(Currency::eur()).to_string(),
            error: Some(message.into()),
            quote: None,
        }
    }

    fn succeeded(quote: ConversionQuote) -> Self {
        Self {
            converted: quote.converted.to_string(),
            fee: quote.fee.to_string(),
            error: None,
            quote: Some(quote),
        }
    }

    /// Check if the submission succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Caller-side front of the conversion engine.
pub struct ConversionForm<'a> {
    engine: &'a ConversionEngine,
    rates: Option<&'a RateTable>,
}

impl<'a> ConversionForm<'a> {
    /// Create a form. `rates` is `None` when the feed could not be loaded.
    pub fn new(engine: &'a ConversionEngine, rates: Option<&'a RateTable>) -> Self {
        Self { engine, rates }
    }

    /// Whether conversions can be attempted at all.
    pub fn is_available(&self) -> bool {
        self.rates.is_some()
    }

    /// Selectable currencies, sorted by code.
    pub fn currencies(&self) -> Vec<&'a Currency> {
        self.rates
            .map(|table| table.sorted_currencies())
            .unwrap_or_default()
    }

    /// Whether `code` names a currency in the loaded table.
    pub fn is_listed(&self, code: &str) -> bool {
        match (self.rates, Currency::parse(code)) {
            (Some(table), Ok(currency)) => table.contains(&currency),
            _ => false,
        }
    }

    /// Validate the input and convert it.
    pub fn submit(&self, from: Option<&str>, to: Option<&str>, amount_text: &str) -> FormOutcome {
        let amount_text = amount_text.trim();
        let (Some(from), Some(to)) = (non_blank(from), non_blank(to)) else {
            return FormOutcome::failed(MSG_INCOMPLETE);
        };
        if amount_text.is_empty() {
            return FormOutcome::failed(MSG_INCOMPLETE);
        }

        let Some(table) = self.rates else {
            return FormOutcome::failed(MSG_RATES_UNAVAILABLE);
        };

        let Some(amount) = parse_amount(amount_text) else {
            return FormOutcome::failed(MSG_INVALID_AMOUNT);
        };
        if amount < Decimal::ZERO {
            return FormOutcome::failed(MSG_NEGATIVE_AMOUNT);
        }

        let (from, to) = match (Currency::parse(from), Currency::parse(to)) {
            (Ok(from), Ok(to)) => (from, to),
            (Err(e), _) | (_, Err(e)) => {
                return FormOutcome::failed(format!("Error: {}", FxError::InvalidCurrency(e.0)));
            }
        };

        let request = ConversionRequest::new(from, to, amount);
        match self.engine.quote(&request, table) {
            Ok(quote) => FormOutcome::succeeded(quote),
            Err(e) => FormOutcome::failed(error_message(&e)),
        }
    }
}

/// Message shown for an engine error. Only currency problems are explained
/// to the user.
fn error_message(e: &FxError) -> String {
    match e {
        FxError::InvalidCurrency(_) | FxError::ZeroRate(_) => format!("Error: {}", e),
        _ => {
            error!(error = %e, "Conversion failed");
            MSG_UNEXPECTED.to_string()
        }
    }
}

/// Parse amount text as typed by a user, accepting plain and scientific
/// notation.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Render a rate table as one `CODE  rate` line per currency.
pub fn render_rate_list(table: &RateTable) -> String {
    let header = match table.as_of() {
        Some(date) => format!("Rates per 1 {} as of {}\n", table.base(), date),
        None => format!("Rates per 1 {}\n", table.base()),
    };
    let lines = table.sorted_currencies().into_iter().filter_map(|currency| {
        table
            .rate(currency)
            .map(|rate| format!("{}  {}\n", currency, rate.normalize()))
    });

    std::iter::once(header).chain(lines).collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn setup_table() -> RateTable {
        RateTable::from_rates(
            Currency::eur(),
            [(Currency::usd(), dec!(1.1)), (Currency::gbp(), dec!(0.9))],
        )
        .unwrap()
    }

    #[test]
    fn test_successful_conversion() {
        let engine = ConversionEngine::default();
        let table = setup_table();
        let form = ConversionForm::new(&engine, Some(&table));

        let outcome = form.submit(Some("EUR"), Some("USD"), "100");

        assert!(outcome.is_ok());
        assert_eq!(outcome.converted, "110.00 USD");
        assert_eq!(outcome.fee, "4.00 EUR");
        assert!(outcome.quote.is_some());
    }

    #[test]
    fn test_fee_uses_base_equivalent() {
        let engine = ConversionEngine::default();
        let table = setup_table();
        let form = ConversionForm::new(&engine, Some(&table));

        // 330 USD is 300 EUR: three complete blocks, 2.56%.
        let outcome = form.submit(Some("usd"), Some("gbp"), " 330 ");

        assert_eq!(outcome.converted, "270.00 GBP");
        assert_eq!(outcome.fee, "7.68 EUR");
    }

    #[test]
    fn test_missing_input() {
        let engine = ConversionEngine::default();
        let table = setup_table();
        let form = ConversionForm::new(&engine, Some(&table));

        assert_eq!(form.submit(None, Some("USD"), "1").error.as_deref(), Some(MSG_INCOMPLETE));
        assert_eq!(form.submit(Some("EUR"), Some(" "), "1").error.as_deref(), Some(MSG_INCOMPLETE));
        assert_eq!(form.submit(Some("EUR"), Some("USD"), "   ").error.as_deref(), Some(MSG_INCOMPLETE));
    }

    #[test]
    fn test_rates_unavailable() {
        let engine = ConversionEngine::default();
        let form = ConversionForm::new(&engine, None);

        assert!(!form.is_available());
        assert!(form.currencies().is_empty());

        let outcome = form.submit(Some("EUR"), Some("USD"), "100");
        assert_eq!(outcome.error.as_deref(), Some(MSG_RATES_UNAVAILABLE));
        assert_eq!(outcome.converted, "0.00");
        assert_eq!(outcome.fee, "0.00 EUR");
    }

    #[test]
    fn test_invalid_and_negative_amounts() {
        let engine = ConversionEngine::default();
        let table = setup_table();
        let form = ConversionForm::new(&engine, Some(&table));

        assert_eq!(
            form.submit(Some("EUR"), Some("USD"), "ten").error.as_deref(),
            Some(MSG_INVALID_AMOUNT)
        );
        assert_eq!(
            form.submit(Some("EUR"), Some("USD"), "-5").error.as_deref(),
            Some(MSG_NEGATIVE_AMOUNT)
        );
    }

    #[test]
    fn test_zero_amount_is_accepted() {
        let engine = ConversionEngine::default();
        let table = setup_table();
        let form = ConversionForm::new(&engine, Some(&table));

        let outcome = form.submit(Some("EUR"), Some("GBP"), "0");

        assert!(outcome.is_ok());
        assert_eq!(outcome.converted, "0.00 GBP");
        assert_eq!(outcome.fee, "0.00 EUR");
    }

    #[test]
    fn test_unknown_currency() {
        let engine = ConversionEngine::default();
        let table = setup_table();
        let form = ConversionForm::new(&engine, Some(&table));

        let outcome = form.submit(Some("XXX"), Some("GBP"), "100");
        assert_eq!(
            outcome.error.as_deref(),
            Some("Error: Invalid currency code provided: XXX")
        );

        let outcome = form.submit(Some("EUR"), Some("POUNDS"), "100");
        assert_eq!(
            outcome.error.as_deref(),
            Some("Error: Invalid currency code provided: POUNDS")
        );
    }

    #[test]
    fn test_engine_overflow_is_unexpected() {
        let engine = ConversionEngine::default();
        let table = RateTable::from_rates(Currency::eur(), [(Currency::jpy(), dec!(0.0001))]).unwrap();
        let form = ConversionForm::new(&engine, Some(&table));

        let outcome = form.submit(Some("JPY"), Some("EUR"), "79228162514264337593543950335");

        assert_eq!(outcome.error.as_deref(), Some(MSG_UNEXPECTED));
        assert_eq!(outcome.converted, "0.00");
        assert_eq!(outcome.fee, "0.00 EUR");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            error_message(&FxError::ZeroRate(Currency::jpy())),
            "Error: Exchange rate for JPY is zero."
        );
        assert_eq!(
            error_message(&FxError::InvalidCurrency("XXX".to_string())),
            "Error: Invalid currency code provided: XXX"
        );
        assert_eq!(error_message(&FxError::AmountOutOfRange), MSG_UNEXPECTED);
        assert_eq!(error_message(&FxError::HttpStatus(503)), MSG_UNEXPECTED);
    }

    #[test]
    fn test_is_listed() {
        let engine = ConversionEngine::default();
        let table = setup_table();
        let form = ConversionForm::new(&engine, Some(&table));

        assert!(form.is_listed("usd"));
        assert!(form.is_listed("EUR"));
        assert!(!form.is_listed("XXX"));
        assert!(!form.is_listed("POUNDS"));
        assert!(!ConversionForm::new(&engine, None).is_listed("EUR"));
    }

    #[test]
    fn test_currencies_sorted() {
        let engine = ConversionEngine::default();
        let table = setup_table();
        let form = ConversionForm::new(&engine, Some(&table));

        let codes: Vec<&str> = form.currencies().iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec!["EUR", "GBP", "USD"]);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50"), Some(dec!(12.50)));
        assert_eq!(parse_amount(" 7 "), Some(dec!(7)));
        assert_eq!(parse_amount("1e3"), Some(dec!(1000)));
        assert_eq!(parse_amount("-3"), Some(dec!(-3)));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_render_rate_list() {
        let table = setup_table();
        let rendered = render_rate_list(&table);

        assert_eq!(rendered, "Rates per 1 EUR\nEUR  1\nGBP  0.9\nUSD  1.1\n");
    }

    #[test]
    fn test_render_rate_list_with_date() {
        let mut builder = RateTable::builder(Currency::eur());
        builder.as_of(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let table = builder.build();

        assert_eq!(render_rate_list(&table), "Rates per 1 EUR as of 2024-03-15\nEUR  1\n");
    }
}
