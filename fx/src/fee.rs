//! Tiered service fee schedule.
//!
//! The fee percentage starts at `base_percentage` and is multiplied by
//! `decay` once for every complete `block_size` of the base-currency amount:
//! `percentage = base_percentage * decay^floor(amount / block_size)`.

use eurofx_common::{round_half_up, AMOUNT_DECIMAL_PLACES};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parameters of the multiplicatively decaying fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Percentage charged below the first block, as a fraction.
    pub base_percentage: Decimal,
    /// Factor applied to the percentage per complete block.
    pub decay: Decimal,
    /// Size of one block in base-currency units.
    pub block_size: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            base_percentage: Decimal::new(5, 2), // 5%
            decay: Decimal::new(80, 2),
            block_size: Decimal::ONE_HUNDRED,
        }
    }
}

impl FeeSchedule {
    /// Validate the schedule parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_percentage < Decimal::ZERO || self.base_percentage > Decimal::ONE {
            return Err("Base fee percentage must be between 0 and 1".to_string());
        }

        if self.decay <= Decimal::ZERO || self.decay > Decimal::ONE {
            return Err("Fee decay must be in (0, 1]".to_string());
        }

        if self.block_size <= Decimal::ZERO {
            return Err("Fee block size must be positive".to_string());
        }

        Ok(())
    }

    /// Number of complete blocks contained in the amount.
    pub fn complete_blocks(&self, amount_in_base: Decimal) -> u64 {
        if amount_in_base <= Decimal::ZERO {
            return 0;
        }
        amount_in_base
            .checked_div(self.block_size)
            .and_then(|blocks| blocks.floor().to_u64())
            .unwrap_or(u64::MAX)
    }

    /// Effective fee percentage (as a fraction) for an amount.
    pub fn percentage_for(&self, amount_in_base: Decimal) -> Decimal {
        let blocks = self.complete_blocks(amount_in_base);
        self.base_percentage * decay_factor(self.decay, blocks)
    }

    /// Fee for an amount already expressed in the base currency, rounded to
    /// two decimal places. Non-positive amounts carry no fee.
    pub fn calculate(&self, amount_in_base: Decimal) -> Decimal {
        if amount_in_base <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let fee = amount_in_base * self.percentage_for(amount_in_base);
        round_half_up(fee, AMOUNT_DECIMAL_PLACES)
    }
}

/// `decay^blocks` by repeated squaring.
fn decay_factor(decay: Decimal, mut blocks: u64) -> Decimal {
    let mut result = Decimal::ONE;
    let mut square = decay;

    while blocks > 0 {
        if blocks & 1 == 1 {
            result *= square;
            if result.is_zero() {
                break;
            }
        }
        blocks >>= 1;
        if blocks > 0 {
            square *= square;
            if square.is_zero() {
                return Decimal::ZERO;
            }
        }
    }

    result
}
