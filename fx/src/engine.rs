//! Conversion and fee engine.
//!
//! The engine never fetches rates; every operation receives the rate table
//! snapshot it should use.

use eurofx_common::{round_half_up, Currency, Money, RateTable, AMOUNT_DECIMAL_PLACES};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::conversion::{ConversionQuote, ConversionRequest};
use crate::error::{FxError, FxResult};
use crate::fee::FeeSchedule;

/// Decimal places kept for the base-currency amount the fee is computed on.
pub const BASE_EQUIVALENT_DECIMAL_PLACES: u32 = 4;

/// Configuration for the conversion engine.
#[derive(Debug, Clone, Default)]
pub struct FxEngineConfig {
    /// Fee tiers.
    pub fee_schedule: FeeSchedule,
}

impl FxEngineConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.fee_schedule.validate()
    }
}

/// Cross-rate conversion and tiered fee calculation.
#[derive(Debug, Clone, Default)]
pub struct ConversionEngine {
    config: FxEngineConfig,
}

impl ConversionEngine {
    /// Create a new engine.
    pub fn new(config: FxEngineConfig) -> Self {
        Self { config }
    }

    /// Get the fee schedule in use.
    pub fn fee_schedule(&self) -> &FeeSchedule {
        &self.config.fee_schedule
    }

    /// Convert `amount` of `from` into `to`, going through the base currency.
    ///
    /// Non-positive amounts convert to zero without looking at the table.
    /// The result is rounded to two decimal places, ties away from zero.
    pub fn convert(
        &self,
        from: &Currency,
        to: &Currency,
        amount: Decimal,
        table: &RateTable,
    ) -> FxResult<Decimal> {
        if amount <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let rate_from = lookup_rate(table, from)?;
        let rate_to = lookup_rate(table, to)?;

        let amount_in_base = if table.is_base(from) {
            amount
        } else {
            amount
                .checked_div(rate_from)
                .ok_or(FxError::AmountOutOfRange)?
        };

        let converted = if table.is_base(to) {
            amount_in_base
        } else {
            amount_in_base
                .checked_mul(rate_to)
                .ok_or(FxError::AmountOutOfRange)?
        };

        let converted = round_half_up(converted, AMOUNT_DECIMAL_PLACES);
        debug!(%from, %to, %amount, %converted, "Converted amount");
        Ok(converted)
    }

    /// Fee for an amount already expressed in the base currency.
    pub fn calculate_fee(&self, amount_in_base: Decimal) -> Decimal {
        self.config.fee_schedule.calculate(amount_in_base)
    }

    /// Express `amount` of `from` in the base currency for fee purposes.
    ///
    /// Base amounts pass through unchanged; anything else is divided by its
    /// rate and rounded to four decimal places.
    pub fn base_equivalent(
        &self,
        from: &Currency,
        amount: Decimal,
        table: &RateTable,
    ) -> FxResult<Decimal> {
        if table.is_base(from) {
            return Ok(amount);
        }

        let rate = lookup_rate(table, from)?;
        // Built tables only hold positive rates.
        if rate.is_zero() {
            return Err(FxError::ZeroRate(from.clone()));
        }

        let in_base = amount.checked_div(rate).ok_or(FxError::AmountOutOfRange)?;
        Ok(round_half_up(in_base, BASE_EQUIVALENT_DECIMAL_PLACES))
    }

    /// Convert a request and price its fee.
    #[instrument(skip(self, request, table), fields(
        from = %request.from,
        to = %request.to,
        amount = %request.amount
    ))]
    pub fn quote(&self, request: &ConversionRequest, table: &RateTable) -> FxResult<ConversionQuote> {
        let base = table.base().clone();

        if request.amount <= Decimal::ZERO {
            return Ok(ConversionQuote::zero(request.clone(), base));
        }

        let converted = self.convert(&request.from, &request.to, request.amount, table)?;
        let base_equivalent = self.base_equivalent(&request.from, request.amount, table)?;
        let fee = self.calculate_fee(base_equivalent);
        let fee_percentage = self.config.fee_schedule.percentage_for(base_equivalent);

        info!(%converted, %base_equivalent, %fee, "Quote computed");

        Ok(ConversionQuote {
            request: request.clone(),
            converted: Money::new(converted, request.to.clone()),
            base_equivalent: Money::new(base_equivalent, base.clone()),
            fee: Money::new(fee, base),
            fee_percentage,
        })
    }
}

fn lookup_rate(table: &RateTable, currency: &Currency) -> FxResult<Decimal> {
    table
        .rate(currency)
        .ok_or_else(|| FxError::InvalidCurrency(currency.code().to_string()))
}
