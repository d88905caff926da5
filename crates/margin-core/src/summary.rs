//! # Summary Module
//!
//! Aggregate figures over a set of sales (the totals row of the sales list).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{div_round_half_up, Money};
use crate::types::Sale;

/// Totals over a filtered list of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub total_received_cents: i64,
    /// Printing + shipping + platform fees.
    pub total_costs_cents: i64,
    pub total_net_profit_cents: i64,
    /// Mean of the stored margins; 0 for an empty set.
    pub average_margin_bps: i64,
}

impl SalesSummary {
    /// Summarizes `sales`.
    ///
    /// ## Example
    /// ```rust
    /// use margin_core::summary::SalesSummary;
    ///
    /// let summary = SalesSummary::from_sales(&[]);
    /// assert_eq!(summary.sale_count, 0);
    /// assert_eq!(summary.average_margin_bps, 0);
    /// ```
    pub fn from_sales(sales: &[Sale]) -> Self {
        let received: Money = sales.iter().map(Sale::amount_received).sum();
        let costs: Money = sales.iter().map(Sale::total_costs).sum();
        let net: Money = sales.iter().map(Sale::net_profit).sum();
        let margin_sum: i128 = sales.iter().map(|s| s.profit_margin_bps as i128).sum();

        let average_margin_bps = if sales.is_empty() {
            0
        } else {
            div_round_half_up(margin_sum, sales.len() as i128) as i64
        };

        SalesSummary {
            sale_count: sales.len() as i64,
            total_received_cents: received.cents(),
            total_costs_cents: costs.cents(),
            total_net_profit_cents: net.cents(),
            average_margin_bps,
        }
    }
}
