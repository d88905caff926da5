//! # Domain Types
//!
//! Core data structures for Margin Ledger.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────┐         ┌──────────────────────────────────────────┐  │
//! │  │  Platform   │ 1     * │                  Sale                    │  │
//! │  │─────────────│◄────────│──────────────────────────────────────────│  │
//! │  │ id          │         │ platform_id          (plain reference)   │  │
//! │  │ name        │ ······► │ platform_name        ┐ snapshot taken    │  │
//! │  │ fixed_fee   │         │ platform_commission  ┘ at last recalc    │  │
//! │  │ commission  │         │ amount_received / printing / shipping    │  │
//! │  └─────────────┘         │ platform_fee_total   ┐                   │  │
//! │                          │ net_profit           │ derived, cached   │  │
//! │                          │ profit_margin        ┘                   │  │
//! │                          └──────────────────────────────────────────┘  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The platform reference is not enforced: deleting a platform leaves its
//! sales pointing at a missing id, with their snapshot intact.
//!
//! ## Wire Format
//! All money fields end in `_cents` (i64) and all rates end in `_bps`
//! (hundredths of a percent, i64). Timestamps are RFC 3339 strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Percent};
use crate::patch::Patch;

// =============================================================================
// Platform
// =============================================================================

/// A sales channel with its own fixed fee and percentage commission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Platform {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, e.g. "Shopee".
    pub name: String,

    /// Fixed fee charged per sale, in cents.
    pub fixed_fee_cents: i64,

    /// Commission in basis points (1200 = 12%).
    pub commission_bps: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Platform {
    /// Returns the fixed fee as a Money type.
    #[inline]
    pub fn fixed_fee(&self) -> Money {
        Money::from_cents(self.fixed_fee_cents)
    }

    /// Returns the commission rate.
    #[inline]
    pub fn commission(&self) -> Percent {
        Percent::from_bps(self.commission_bps)
    }
}

/// Payload for creating a platform.
///
/// Fee and commission default to zero when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPlatform {
    pub name: String,
    pub fixed_fee_cents: Option<i64>,
    pub commission_bps: Option<i64>,
}

/// Sparse payload for updating a platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformChanges {
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub fixed_fee_cents: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub commission_bps: Patch<i64>,
}

impl PlatformChanges {
    /// Returns true when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_unset() && self.fixed_fee_cents.is_unset() && self.commission_bps.is_unset()
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// Fulfilment status of a sale.
///
/// A plain field: any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// The item is still being printed/made.
    InProduction,
    /// Made, waiting to be posted.
    AwaitingShipment,
    /// Posted to the customer.
    Shipped,
    /// Delivered and closed.
    Completed,
}

impl SaleStatus {
    /// All statuses, in fulfilment order.
    pub const ALL: [SaleStatus; 4] = [
        SaleStatus::InProduction,
        SaleStatus::AwaitingShipment,
        SaleStatus::Shipped,
        SaleStatus::Completed,
    ];

    /// The snake_case name used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::InProduction => "in_production",
            SaleStatus::AwaitingShipment => "awaiting_shipment",
            SaleStatus::Shipped => "shipped",
            SaleStatus::Completed => "completed",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::InProduction
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One recorded sale with its costs, platform snapshot and derived figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub description: Option<String>,
    pub amount_received_cents: i64,
    pub printing_cost_cents: i64,
    pub shipping_cost_cents: i64,

    /// Reference to a platform. Not guaranteed to still exist.
    pub platform_id: String,
    /// Platform name at the time of the last recalculation.
    pub platform_name: String,
    /// Platform commission at the time of the last recalculation.
    pub platform_commission_bps: i64,

    pub platform_fee_total_cents: i64,
    pub net_profit_cents: i64,
    pub profit_margin_bps: i64,

    /// Where the order came from ("Instagram DM", "Feira", ...).
    pub origin_channel: String,
    pub status: SaleStatus,

    /// Set once at creation.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Set on every write.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn amount_received(&self) -> Money {
        Money::from_cents(self.amount_received_cents)
    }

    #[inline]
    pub fn printing_cost(&self) -> Money {
        Money::from_cents(self.printing_cost_cents)
    }

    #[inline]
    pub fn shipping_cost(&self) -> Money {
        Money::from_cents(self.shipping_cost_cents)
    }

    #[inline]
    pub fn platform_fee_total(&self) -> Money {
        Money::from_cents(self.platform_fee_total_cents)
    }

    #[inline]
    pub fn net_profit(&self) -> Money {
        Money::from_cents(self.net_profit_cents)
    }

    #[inline]
    pub fn profit_margin(&self) -> Percent {
        Percent::from_bps(self.profit_margin_bps)
    }

    /// Printing + shipping + platform fee.
    pub fn total_costs(&self) -> Money {
        self.printing_cost() + self.shipping_cost() + self.platform_fee_total()
    }
}

// =============================================================================
// Sale Payloads
// =============================================================================

/// Payload for creating a sale.
///
/// Required fields are `Option` so a missing field surfaces as a
/// `ValidationError::Required` naming it, rather than a generic parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSale {
    pub description: Option<String>,
    pub amount_received_cents: Option<i64>,
    pub printing_cost_cents: Option<i64>,
    pub shipping_cost_cents: Option<i64>,
    pub platform_id: Option<String>,
    pub origin_channel: Option<String>,
}

/// Sparse payload for updating a sale.
///
/// Only supplied fields are changed; see [`crate::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleChanges {
    /// `null` clears the description.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub description: Patch<Option<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub amount_received_cents: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub printing_cost_cents: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub shipping_cost_cents: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub platform_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub origin_channel: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub status: Patch<SaleStatus>,
}

impl SaleChanges {
    /// Returns true when any field feeding the profit calculation was supplied.
    pub fn touches_financials(&self) -> bool {
        self.amount_received_cents.is_set()
            || self.printing_cost_cents.is_set()
            || self.shipping_cost_cents.is_set()
    }
}

// =============================================================================
// Queries
// =============================================================================

/// Column a sale listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    AmountReceived,
    NetProfit,
    ProfitMargin,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filters for listing sales and for the summary.
///
/// `from` and `to` are whole UTC days, both inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleFilter {
    pub status: Option<SaleStatus>,
    /// Case-insensitive substring of the origin channel.
    pub origin_channel: Option<String>,
    pub platform_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl SaleFilter {
    /// Returns true when `sale` passes every filter.
    ///
    /// Mirrors the SQL built by the sale repository; blank text filters are
    /// ignored.
    pub fn matches(&self, sale: &Sale) -> bool {
        if let Some(status) = self.status {
            if sale.status != status {
                return false;
            }
        }

        if let Some(origin) = self.origin_channel.as_deref().map(str::trim) {
            if !origin.is_empty()
                && !sale
                    .origin_channel
                    .to_lowercase()
                    .contains(&origin.to_lowercase())
            {
                return false;
            }
        }

        if let Some(platform_id) = self.platform_id.as_deref().map(str::trim) {
            if !platform_id.is_empty() && sale.platform_id != platform_id {
                return false;
            }
        }

        let day = sale.created_at.date_naive();
        if self.from.is_some_and(|from| day < from) {
            return false;
        }
        if self.to.is_some_and(|to| day > to) {
            return false;
        }

        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sale_at(origin: &str, status: SaleStatus, day: u32) -> Sale {
        let at = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        Sale {
            id: format!("s-{day}"),
            description: None,
            amount_received_cents: 10000,
            printing_cost_cents: 1000,
            shipping_cost_cents: 2000,
            platform_id: "p1".to_string(),
            platform_name: "Shopee".to_string(),
            platform_commission_bps: 1200,
            platform_fee_total_cents: 1700,
            net_profit_cents: 5300,
            profit_margin_bps: 5300,
            origin_channel: origin.to_string(),
            status,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_status_wire_names() {
        for status in SaleStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert_eq!(SaleStatus::default(), SaleStatus::InProduction);
    }

    #[test]
    fn test_sale_total_costs() {
        let sale = sale_at("Instagram", SaleStatus::Shipped, 1);
        assert_eq!(sale.total_costs().cents(), 4700);
        assert_eq!(sale.profit_margin().bps(), 5300);
    }

    #[test]
    fn test_sale_changes_touches_financials() {
        let mut changes = SaleChanges::default();
        assert!(!changes.touches_financials());

        changes.status = Patch::Set(SaleStatus::Shipped);
        changes.platform_id = Patch::Set("p2".to_string());
        assert!(!changes.touches_financials());

        changes.shipping_cost_cents = Patch::Set(0);
        assert!(changes.touches_financials());
    }

    #[test]
    fn test_sale_changes_from_json() {
        let changes: SaleChanges =
            serde_json::from_str(r#"{"description": null, "status": "awaiting_shipment"}"#).unwrap();
        assert_eq!(changes.description, Patch::Set(None));
        assert_eq!(changes.status, Patch::Set(SaleStatus::AwaitingShipment));
        assert!(changes.amount_received_cents.is_unset());
    }

    #[test]
    fn test_filter_matches() {
        let sale = sale_at("Instagram DM", SaleStatus::Shipped, 10);

        assert!(SaleFilter::default().matches(&sale));

        let filter = SaleFilter {
            origin_channel: Some("insta".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&sale));

        let filter = SaleFilter {
            status: Some(SaleStatus::Completed),
            ..Default::default()
        };
        assert!(!filter.matches(&sale));

        let filter = SaleFilter {
            platform_id: Some("p2".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&sale));
    }

    #[test]
    fn test_filter_date_range_is_inclusive() {
        let sale = sale_at("Feira", SaleStatus::Completed, 10);
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();

        let filter = SaleFilter {
            from: Some(day(10)),
            to: Some(day(10)),
            ..Default::default()
        };
        assert!(filter.matches(&sale));

        let filter = SaleFilter {
            from: Some(day(11)),
            ..Default::default()
        };
        assert!(!filter.matches(&sale));

        let filter = SaleFilter {
            to: Some(day(9)),
            ..Default::default()
        };
        assert!(!filter.matches(&sale));
    }

    #[test]
    fn test_filter_from_query_json() {
        let filter: SaleFilter = serde_json::from_str(
            r#"{"status": "shipped", "from": "2024-03-01", "sort_by": "net_profit", "order": "asc"}"#,
        )
        .unwrap();
        assert_eq!(filter.status, Some(SaleStatus::Shipped));
        assert_eq!(filter.sort_by, SortField::NetProfit);
        assert_eq!(filter.order, SortOrder::Asc);
        assert_eq!(filter.from, NaiveDate::from_ymd_opt(2024, 3, 1));
    }
}
