//! # Profit Module
//!
//! Computes the platform fee, net profit and profit margin of a sale.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  a = amount received (cents)      p = commission (bps)                  │
//! │  f = platform fixed fee (cents)   c = printing + shipping (cents)       │
//! │                                                                         │
//! │  fee_exact  = f + a × p / 10000            (kept exact, i128)           │
//! │                                                                         │
//! │  platform_fee_total = round(fee_exact)                                  │
//! │  net_profit         = round(a − fee_exact − c)     ← unrounded fee      │
//! │  profit_margin      = 0                        if a = 0                 │
//! │                     = round(net_profit / a)    otherwise ← rounded net  │
//! │                                                                         │
//! │  round = half away from zero, to whole cents / whole bps                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use margin_core::money::{Money, Percent};
//! use margin_core::profit::{ProfitCalculator, ProfitInput};
//!
//! let input = ProfitInput {
//!     amount_received: Money::from_cents(15000),
//!     printing_cost: Money::from_cents(3000),
//!     fixed_fee: Money::from_cents(500),
//!     commission: Percent::from_bps(1200),
//!     shipping_cost: Money::from_cents(1500),
//! };
//!
//! let result = ProfitCalculator::compute(&input).unwrap();
//! assert_eq!(result.platform_fee_total.cents(), 2300);
//! assert_eq!(result.net_profit.cents(), 8200);
//! assert_eq!(result.profit_margin.bps(), 5467);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::{Money, Percent};
use crate::types::Platform;
use crate::validation::{validate_commission, validate_money};

// =============================================================================
// Input / Output
// =============================================================================

/// Everything the calculation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfitInput {
    pub amount_received: Money,
    pub printing_cost: Money,
    pub fixed_fee: Money,
    pub commission: Percent,
    pub shipping_cost: Money,
}

impl ProfitInput {
    /// Builds an input from sale figures and a platform's current terms.
    pub fn for_platform(
        amount_received: Money,
        printing_cost: Money,
        shipping_cost: Money,
        platform: &Platform,
    ) -> Self {
        ProfitInput {
            amount_received,
            printing_cost,
            fixed_fee: platform.fixed_fee(),
            commission: platform.commission(),
            shipping_cost,
        }
    }
}

/// The three derived figures stored on a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub platform_fee_total: Money,
    pub net_profit: Money,
    pub profit_margin: Percent,
}

// =============================================================================
// Calculator
// =============================================================================

/// Stateless profit calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfitCalculator;

impl ProfitCalculator {
    /// Validates the input and computes the breakdown.
    ///
    /// ## Errors
    /// `CoreError::Validation` naming the first field that is negative
    /// (`Negative`) or above its ceiling (`TooLarge`), checked in this order:
    /// `amount_received`, `printing_cost`, `fixed_fee`, `commission_percent`,
    /// `shipping_cost`.
    ///
    /// Within the ceilings every output fits in `i64`.
    pub fn compute(input: &ProfitInput) -> CoreResult<ProfitBreakdown> {
        validate_money("amount_received", input.amount_received.cents())?;
        validate_money("printing_cost", input.printing_cost.cents())?;
        validate_money("fixed_fee", input.fixed_fee.cents())?;
        validate_commission("commission_percent", input.commission.bps())?;
        validate_money("shipping_cost", input.shipping_cost.cents())?;

        let amount = input.amount_received;

        // Scale 1/10000 cent; nothing is rounded until the outputs.
        let fee_exact = input.fixed_fee.scaled() + amount.scaled_percentage(input.commission);
        let net_exact = amount.scaled()
            - fee_exact
            - input.printing_cost.scaled()
            - input.shipping_cost.scaled();

        let platform_fee_total = Money::from_scaled(fee_exact);
        let net_profit = Money::from_scaled(net_exact);
        let profit_margin = Percent::ratio(net_profit, amount);

        Ok(ProfitBreakdown {
            platform_fee_total,
            net_profit,
            profit_margin,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
