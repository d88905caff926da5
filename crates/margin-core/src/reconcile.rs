//! # Reconcile Module
//!
//! Turns a sparse change request into the exact set of fields to persist.
//!
//! ## Update Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SaleReconciler::reconcile                          │
//! │                                                                         │
//! │  existing Sale + SaleChanges                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate supplied fields (amount, printing, shipping, origin, ...)     │
//! │       │                                                                 │
//! │       ├── platform_id supplied AND different?                           │
//! │       │      └── lookup(new id) ── missing ──► PlatformNotFound         │
//! │       │            └── recalc + new snapshot (id, name, commission)     │
//! │       │                                                                 │
//! │       ├── amount / printing / shipping supplied?                        │
//! │       │      └── lookup(existing id) ── missing ──► PlatformNotFound    │
//! │       │            └── recalc with fresh terms + refreshed snapshot     │
//! │       │                                                                 │
//! │       └── otherwise: derived fields untouched                           │
//! │                                                                         │
//! │  SaleUpdate (only supplied + derived fields) ──► persistence            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure happens before a `SaleUpdate` exists, so a rejected update
//! can never be half-applied.
//!
//! Platform terms always come from the lookup, never from the sale's own
//! snapshot; a platform whose fee changed since the sale was recorded is
//! picked up on the next financial edit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{CoreError, ReconcileError};
use crate::money::Money;
use crate::patch::Patch;
use crate::profit::{ProfitBreakdown, ProfitCalculator, ProfitInput};
use crate::types::{NewSale, Platform, Sale, SaleChanges, SaleStatus};
use crate::validation::{
    money_or_zero, normalize_description, required_money, validate_money, validate_required_text,
};
use crate::MAX_NAME_LEN;

// =============================================================================
// Platform Lookup Capability
// =============================================================================

/// Read access to platforms.
///
/// Implemented by the database layer; tests use an in-memory map.
#[async_trait]
pub trait PlatformLookup: Send + Sync {
    /// Error raised by the underlying store. Passed through untouched.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the platform with `id`, or `None` when it does not exist.
    async fn find_platform_by_id(&self, id: &str) -> Result<Option<Platform>, Self::Error>;
}

// =============================================================================
// Sale Update
// =============================================================================

/// The sparse set of fields an update writes.
///
/// `Unset` fields are left as stored. When `recalculated` is present the
/// three derived columns are written as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaleUpdate {
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub description: Patch<Option<String>>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub amount_received_cents: Patch<i64>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub printing_cost_cents: Patch<i64>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub shipping_cost_cents: Patch<i64>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub platform_id: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub platform_name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub platform_commission_bps: Patch<i64>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub origin_channel: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub status: Patch<SaleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recalculated: Option<ProfitBreakdown>,
}

impl SaleUpdate {
    /// Returns true when nothing would be written.
    pub fn is_empty(&self) -> bool {
        self == &SaleUpdate::default()
    }

    /// Applies the update to an in-memory sale.
    ///
    /// Does not touch `updated_at`; the writer owns timestamps.
    pub fn apply_to(&self, sale: &mut Sale) {
        self.description.clone().apply(&mut sale.description);
        self.amount_received_cents.apply(&mut sale.amount_received_cents);
        self.printing_cost_cents.apply(&mut sale.printing_cost_cents);
        self.shipping_cost_cents.apply(&mut sale.shipping_cost_cents);
        self.platform_id.clone().apply(&mut sale.platform_id);
        self.platform_name.clone().apply(&mut sale.platform_name);
        self.platform_commission_bps.apply(&mut sale.platform_commission_bps);
        self.origin_channel.clone().apply(&mut sale.origin_channel);
        self.status.apply(&mut sale.status);

        if let Some(figures) = self.recalculated {
            sale.platform_fee_total_cents = figures.platform_fee_total.cents();
            sale.net_profit_cents = figures.net_profit.cents();
            sale.profit_margin_bps = figures.profit_margin.bps();
        }
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// Which platform an update must be recalculated against.
enum Recalculation<'a> {
    /// Platform reassigned to this id.
    NewPlatform(&'a str),
    /// Financial fields changed; use the sale's current platform.
    SamePlatform,
    /// Nothing to recalculate.
    None,
}

/// Stateless sale create/update logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaleReconciler;

impl SaleReconciler {
    pub fn new() -> Self {
        SaleReconciler
    }

    /// Builds a new sale from a creation payload.
    ///
    /// ## Validation Order
    /// 1. `amount_received`: required, `0..=MAX_MONEY_CENTS`
    /// 2. `origin_channel`: required, non-empty after trim
    /// 3. `platform_id`: required
    /// 4. `printing_cost`, `shipping_cost`: default 0, same range
    /// 5. platform must exist (`PlatformNotFound`)
    ///
    /// `id` and `now` come from the caller so this stays deterministic.
    pub async fn create<L>(
        &self,
        input: NewSale,
        lookup: &L,
        id: String,
        now: DateTime<Utc>,
    ) -> Result<Sale, ReconcileError<L::Error>>
    where
        L: PlatformLookup + ?Sized,
    {
        let amount_received_cents =
            required_money("amount_received", input.amount_received_cents)?;
        let origin_channel = validate_required_text(
            "origin_channel",
            input.origin_channel.as_deref().unwrap_or_default(),
            MAX_NAME_LEN,
        )?;
        let platform_id = validate_required_text(
            "platform_id",
            input.platform_id.as_deref().unwrap_or_default(),
            MAX_NAME_LEN,
        )?;
        let printing_cost_cents = money_or_zero("printing_cost", input.printing_cost_cents)?;
        let shipping_cost_cents = money_or_zero("shipping_cost", input.shipping_cost_cents)?;
        let description = normalize_description(input.description)?;

        let platform = Self::resolve_platform(lookup, &platform_id).await?;

        let figures = ProfitCalculator::compute(&ProfitInput::for_platform(
            Money::from_cents(amount_received_cents),
            Money::from_cents(printing_cost_cents),
            Money::from_cents(shipping_cost_cents),
            &platform,
        ))?;

        Ok(Sale {
            id,
            description,
            amount_received_cents,
            printing_cost_cents,
            shipping_cost_cents,
            platform_id: platform.id,
            platform_name: platform.name,
            platform_commission_bps: platform.commission_bps,
            platform_fee_total_cents: figures.platform_fee_total.cents(),
            net_profit_cents: figures.net_profit.cents(),
            profit_margin_bps: figures.profit_margin.bps(),
            origin_channel,
            status: SaleStatus::InProduction,
            created_at: now,
            updated_at: now,
        })
    }

    /// Decides what an update to `existing` writes.
    ///
    /// ## Errors
    /// - `Validation` for an out-of-range amount/cost or blank origin/platform id,
    ///   checked before any lookup
    /// - `PlatformNotFound` when the new (or, for a financial edit, the
    ///   current) platform does not exist
    /// - `Lookup` when the lookup itself fails
    pub async fn reconcile<L>(
        &self,
        existing: &Sale,
        changes: &SaleChanges,
        lookup: &L,
    ) -> Result<SaleUpdate, ReconcileError<L::Error>>
    where
        L: PlatformLookup + ?Sized,
    {
        let mut update = Self::validated_fields(changes)?;

        let plan = match &update.platform_id {
            Patch::Set(new_id) if *new_id != existing.platform_id => {
                Recalculation::NewPlatform(new_id)
            }
            _ if changes.touches_financials() => Recalculation::SamePlatform,
            _ => Recalculation::None,
        };

        let platform = match plan {
            Recalculation::NewPlatform(id) => Some(Self::resolve_platform(lookup, id).await?),
            Recalculation::SamePlatform => {
                Some(Self::resolve_platform(lookup, &existing.platform_id).await?)
            }
            Recalculation::None => None,
        };

        // Same id as stored: not a reassignment, nothing to write.
        if matches!(&update.platform_id, Patch::Set(id) if *id == existing.platform_id) {
            update.platform_id = Patch::Unset;
        }

        if let Some(platform) = platform {
            let figures = ProfitCalculator::compute(&ProfitInput::for_platform(
                Money::from_cents(update.amount_received_cents.resolve(existing.amount_received_cents)),
                Money::from_cents(update.printing_cost_cents.resolve(existing.printing_cost_cents)),
                Money::from_cents(update.shipping_cost_cents.resolve(existing.shipping_cost_cents)),
                &platform,
            ))?;

            if platform.id != existing.platform_id {
                update.platform_id = Patch::Set(platform.id);
            }
            update.platform_name = Patch::Set(platform.name);
            update.platform_commission_bps = Patch::Set(platform.commission_bps);
            update.recalculated = Some(figures);
        }

        Ok(update)
    }

    /// Validates and normalizes every supplied field.
    ///
    /// Financial fields are checked in calculator order.
    fn validated_fields(changes: &SaleChanges) -> Result<SaleUpdate, CoreError> {
        if let Patch::Set(amount) = changes.amount_received_cents {
            validate_money("amount_received", amount)?;
        }
        if let Patch::Set(printing) = changes.printing_cost_cents {
            validate_money("printing_cost", printing)?;
        }
        if let Patch::Set(shipping) = changes.shipping_cost_cents {
            validate_money("shipping_cost", shipping)?;
        }

        let platform_id = match &changes.platform_id {
            Patch::Set(id) => Patch::Set(validate_required_text("platform_id", id, MAX_NAME_LEN)?),
            Patch::Unset => Patch::Unset,
        };
        let origin_channel = match &changes.origin_channel {
            Patch::Set(origin) => {
                Patch::Set(validate_required_text("origin_channel", origin, MAX_NAME_LEN)?)
            }
            Patch::Unset => Patch::Unset,
        };
        let description = match &changes.description {
            Patch::Set(text) => Patch::Set(normalize_description(text.clone())?),
            Patch::Unset => Patch::Unset,
        };

        Ok(SaleUpdate {
            description,
            amount_received_cents: changes.amount_received_cents,
            printing_cost_cents: changes.printing_cost_cents,
            shipping_cost_cents: changes.shipping_cost_cents,
            platform_id,
            origin_channel,
            status: changes.status,
            ..SaleUpdate::default()
        })
    }

    async fn resolve_platform<L>(lookup: &L, id: &str) -> Result<Platform, ReconcileError<L::Error>>
    where
        L: PlatformLookup + ?Sized,
    {
        lookup
            .find_platform_by_id(id)
            .await
            .map_err(ReconcileError::Lookup)?
            .ok_or_else(|| CoreError::PlatformNotFound(id.to_string()).into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory platform store that counts lookups.
    #[derive(Default)]
    struct Platforms {
        by_id: HashMap<String, Platform>,
        lookups: AtomicUsize,
    }

    impl Platforms {
        fn with(mut self, id: &str, name: &str, fee: i64, commission: i64) -> Self {
            let now = fixed_now();
            self.by_id.insert(
                id.to_string(),
                Platform {
                    id: id.to_string(),
                    name: name.to_string(),
                    fixed_fee_cents: fee,
                    commission_bps: commission,
                    created_at: now,
                    updated_at: now,
                },
            );
            self
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlatformLookup for Platforms {
        type Error = Infallible;

        async fn find_platform_by_id(&self, id: &str) -> Result<Option<Platform>, Infallible> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.by_id.get(id).cloned())
        }
    }

    /// A store that is always down.
    struct Offline;

    #[async_trait]
    impl PlatformLookup for Offline {
        type Error = std::io::Error;

        async fn find_platform_by_id(&self, _id: &str) -> Result<Option<Platform>, Self::Error> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "connection refused"))
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn platforms() -> Platforms {
        Platforms::default()
            .with("p1", "Shopee", 500, 1200)
            .with("p2", "Mercado Livre", 600, 1500)
    }

    /// Sale of 100.00 with costs 10.00/20.00 recorded on p1.
    fn existing_sale() -> Sale {
        let now = fixed_now();
        Sale {
            id: "s1".to_string(),
            description: Some("Dragon figure".to_string()),
            amount_received_cents: 10000,
            printing_cost_cents: 1000,
            shipping_cost_cents: 2000,
            platform_id: "p1".to_string(),
            platform_name: "Shopee".to_string(),
            platform_commission_bps: 1200,
            platform_fee_total_cents: 1700,
            net_profit_cents: 5300,
            profit_margin_bps: 5300,
            origin_channel: "Instagram".to_string(),
            status: SaleStatus::InProduction,
            created_at: now,
            updated_at: now,
        }
    }

    fn core_error<E: std::error::Error>(err: ReconcileError<E>) -> CoreError {
        match err {
            ReconcileError::Core(err) => err,
            ReconcileError::Lookup(err) => panic!("unexpected lookup error: {err}"),
        }
    }

    // -------------------------------------------------------------------------
    // create
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_computes_figures_and_snapshot() {
        let input = NewSale {
            description: Some("  Vase  ".to_string()),
            amount_received_cents: Some(15000),
            printing_cost_cents: Some(3000),
            shipping_cost_cents: Some(1500),
            platform_id: Some("p1".to_string()),
            origin_channel: Some(" Instagram ".to_string()),
        };

        let sale = SaleReconciler::new()
            .create(input, &platforms(), "s-new".to_string(), fixed_now())
            .await
            .unwrap();

        assert_eq!(sale.id, "s-new");
        assert_eq!(sale.description.as_deref(), Some("Vase"));
        assert_eq!(sale.origin_channel, "Instagram");
        assert_eq!(sale.platform_name, "Shopee");
        assert_eq!(sale.platform_commission_bps, 1200);
        assert_eq!(sale.platform_fee_total_cents, 2300);
        assert_eq!(sale.net_profit_cents, 8200);
        assert_eq!(sale.profit_margin_bps, 5467);
        assert_eq!(sale.status, SaleStatus::InProduction);
        assert_eq!(sale.created_at, sale.updated_at);
    }

    #[tokio::test]
    async fn test_create_defaults_costs_to_zero() {
        let input = NewSale {
            amount_received_cents: Some(0),
            platform_id: Some("p2".to_string()),
            origin_channel: Some("Feira".to_string()),
            ..Default::default()
        };

        let sale = SaleReconciler::new()
            .create(input, &platforms(), "s".to_string(), fixed_now())
            .await
            .unwrap();

        assert_eq!(sale.printing_cost_cents, 0);
        assert_eq!(sale.shipping_cost_cents, 0);
        assert_eq!(sale.description, None);
        assert_eq!(sale.platform_fee_total_cents, 600);
        assert_eq!(sale.net_profit_cents, -600);
        assert_eq!(sale.profit_margin_bps, 0);
    }

    #[tokio::test]
    async fn test_create_validation_order() {
        let lookup = platforms();
        let reconciler = SaleReconciler::new();
        let attempt = |input: NewSale| {
            let lookup = &lookup;
            async move {
                let err = reconciler
                    .create(input, lookup, "s".to_string(), fixed_now())
                    .await
                    .unwrap_err();
                match core_error(err) {
                    CoreError::Validation(err) => err,
                    other => panic!("expected validation error, got {other:?}"),
                }
            }
        };

        let err = attempt(NewSale::default()).await;
        assert_eq!(err, ValidationError::Required { field: "amount_received".to_string() });

        let err = attempt(NewSale {
            amount_received_cents: Some(-100),
            ..Default::default()
        })
        .await;
        assert_eq!(err, ValidationError::Negative { field: "amount_received".to_string() });

        let err = attempt(NewSale {
            amount_received_cents: Some(100),
            origin_channel: Some("   ".to_string()),
            ..Default::default()
        })
        .await;
        assert_eq!(err.field(), "origin_channel");

        let err = attempt(NewSale {
            amount_received_cents: Some(100),
            origin_channel: Some("Feira".to_string()),
            ..Default::default()
        })
        .await;
        assert_eq!(err.field(), "platform_id");

        assert_eq!(lookup.lookups(), 0);
    }

    #[tokio::test]
    async fn test_create_unknown_platform() {
        let input = NewSale {
            amount_received_cents: Some(100),
            platform_id: Some("ghost".to_string()),
            origin_channel: Some("Feira".to_string()),
            ..Default::default()
        };

        let err = SaleReconciler::new()
            .create(input, &platforms(), "s".to_string(), fixed_now())
            .await
            .unwrap_err();

        assert!(matches!(core_error(err), CoreError::PlatformNotFound(id) if id == "ghost"));
    }

    // -------------------------------------------------------------------------
    // reconcile
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_platform_switch_keeps_costs_and_uses_new_terms() {
        let lookup = platforms();
        let changes = SaleChanges {
            platform_id: Patch::Set("p2".to_string()),
            ..Default::default()
        };

        let update = SaleReconciler::new()
            .reconcile(&existing_sale(), &changes, &lookup)
            .await
            .unwrap();

        // 100.00 - (6.00 + 15.00) - 10.00 - 20.00 = 49.00
        let figures = update.recalculated.unwrap();
        assert_eq!(figures.platform_fee_total.cents(), 2100);
        assert_eq!(figures.net_profit.cents(), 4900);
        assert_eq!(figures.profit_margin.bps(), 4900);

        assert_eq!(update.platform_id, Patch::Set("p2".to_string()));
        assert_eq!(update.platform_name, Patch::Set("Mercado Livre".to_string()));
        assert_eq!(update.platform_commission_bps, Patch::Set(1500));
        assert!(update.printing_cost_cents.is_unset());
        assert!(update.shipping_cost_cents.is_unset());
        assert!(update.amount_received_cents.is_unset());

        let mut sale = existing_sale();
        update.apply_to(&mut sale);
        assert_eq!(sale.printing_cost_cents, 1000);
        assert_eq!(sale.shipping_cost_cents, 2000);
        assert_eq!(sale.net_profit_cents, 4900);
        assert_eq!(sale.platform_id, "p2");
    }

    #[tokio::test]
    async fn test_unknown_platform_produces_no_update() {
        let lookup = platforms();
        let changes = SaleChanges {
            platform_id: Patch::Set("ghost".to_string()),
            description: Patch::Set(Some("changed".to_string())),
            status: Patch::Set(SaleStatus::Shipped),
            amount_received_cents: Patch::Set(999),
            ..Default::default()
        };

        let err = SaleReconciler::new()
            .reconcile(&existing_sale(), &changes, &lookup)
            .await
            .unwrap_err();

        assert!(matches!(core_error(err), CoreError::PlatformNotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_single_cost_change_uses_fresh_platform_terms() {
        // p1's terms changed after the sale was recorded.
        let lookup = Platforms::default().with("p1", "Shopee Brasil", 300, 1000);
        let changes = SaleChanges {
            printing_cost_cents: Patch::Set(1500),
            ..Default::default()
        };

        let update = SaleReconciler::new()
            .reconcile(&existing_sale(), &changes, &lookup)
            .await
            .unwrap();

        // 100.00 - (3.00 + 10.00) - 15.00 - 20.00 = 52.00
        let figures = update.recalculated.unwrap();
        assert_eq!(figures.platform_fee_total.cents(), 1300);
        assert_eq!(figures.net_profit.cents(), 5200);
        assert_eq!(update.printing_cost_cents, Patch::Set(1500));
        assert!(update.shipping_cost_cents.is_unset());
        assert!(update.platform_id.is_unset());
        assert_eq!(update.platform_name, Patch::Set("Shopee Brasil".to_string()));
        assert_eq!(update.platform_commission_bps, Patch::Set(1000));
        assert_eq!(lookup.lookups(), 1);
    }

    #[tokio::test]
    async fn test_same_platform_id_is_not_a_reassignment() {
        let lookup = platforms();
        let changes = SaleChanges {
            platform_id: Patch::Set("p1".to_string()),
            status: Patch::Set(SaleStatus::Shipped),
            ..Default::default()
        };

        let update = SaleReconciler::new()
            .reconcile(&existing_sale(), &changes, &lookup)
            .await
            .unwrap();

        assert_eq!(update.status, Patch::Set(SaleStatus::Shipped));
        assert!(update.platform_id.is_unset());
        assert!(update.recalculated.is_none());
        assert_eq!(lookup.lookups(), 0);
    }

    #[tokio::test]
    async fn test_descriptive_changes_leave_figures_alone() {
        let lookup = platforms();
        let changes = SaleChanges {
            description: Patch::Set(None),
            origin_channel: Patch::Set("  WhatsApp ".to_string()),
            status: Patch::Set(SaleStatus::Completed),
            ..Default::default()
        };

        let update = SaleReconciler::new()
            .reconcile(&existing_sale(), &changes, &lookup)
            .await
            .unwrap();

        assert!(update.recalculated.is_none());
        assert!(update.platform_name.is_unset());
        assert_eq!(update.origin_channel, Patch::Set("WhatsApp".to_string()));
        assert_eq!(update.description, Patch::Set(None));
        assert_eq!(lookup.lookups(), 0);

        let mut sale = existing_sale();
        update.apply_to(&mut sale);
        assert_eq!(sale.net_profit_cents, 5300);
        assert_eq!(sale.profit_margin_bps, 5300);
        assert_eq!(sale.platform_fee_total_cents, 1700);
        assert_eq!(sale.description, None);
        assert_eq!(sale.status, SaleStatus::Completed);
    }

    #[tokio::test]
    async fn test_empty_changes_produce_empty_update() {
        let update = SaleReconciler::new()
            .reconcile(&existing_sale(), &SaleChanges::default(), &platforms())
            .await
            .unwrap();

        assert!(update.is_empty());
    }

    #[tokio::test]
    async fn test_negative_amount_rejected_before_lookup() {
        let lookup = platforms();
        let changes = SaleChanges {
            amount_received_cents: Patch::Set(-10000),
            shipping_cost_cents: Patch::Set(-1),
            platform_id: Patch::Set("p2".to_string()),
            ..Default::default()
        };

        let err = SaleReconciler::new()
            .reconcile(&existing_sale(), &changes, &lookup)
            .await
            .unwrap_err();

        match core_error(err) {
            CoreError::Validation(err) => assert_eq!(err.field(), "amount_received"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(lookup.lookups(), 0);
    }

    #[tokio::test]
    async fn test_oversized_cost_rejected_before_lookup() {
        let lookup = platforms();
        let changes = SaleChanges {
            printing_cost_cents: Patch::Set(i64::MAX / 2 + 1),
            ..Default::default()
        };

        let err = SaleReconciler::new()
            .reconcile(&existing_sale(), &changes, &lookup)
            .await
            .unwrap_err();

        match core_error(err) {
            CoreError::Validation(err) => {
                assert!(matches!(err, ValidationError::TooLarge { .. }));
                assert_eq!(err.field(), "printing_cost");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(lookup.lookups(), 0);
    }

    #[tokio::test]
    async fn test_blank_origin_rejected() {
        let changes = SaleChanges {
            origin_channel: Patch::Set("   ".to_string()),
            ..Default::default()
        };

        let err = SaleReconciler::new()
            .reconcile(&existing_sale(), &changes, &platforms())
            .await
            .unwrap_err();

        assert!(matches!(
            core_error(err),
            CoreError::Validation(ValidationError::Required { field }) if field == "origin_channel"
        ));
    }

    #[tokio::test]
    async fn test_orphaned_sale_financial_edit_fails() {
        let lookup = Platforms::default().with("p2", "Mercado Livre", 600, 1500);
        let changes = SaleChanges {
            amount_received_cents: Patch::Set(12000),
            ..Default::default()
        };

        let err = SaleReconciler::new()
            .reconcile(&existing_sale(), &changes, &lookup)
            .await
            .unwrap_err();

        assert!(matches!(core_error(err), CoreError::PlatformNotFound(id) if id == "p1"));
    }

    #[tokio::test]
    async fn test_lookup_failure_passes_through() {
        let changes = SaleChanges {
            shipping_cost_cents: Patch::Set(0),
            ..Default::default()
        };

        let err = SaleReconciler::new()
            .reconcile(&existing_sale(), &changes, &Offline)
            .await
            .unwrap_err();

        match err {
            ReconcileError::Lookup(err) => assert_eq!(err.to_string(), "connection refused"),
            other => panic!("expected lookup error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resending_current_value_still_recalculates() {
        let lookup = platforms();
        let sale = existing_sale();
        let changes = SaleChanges {
            amount_received_cents: Patch::Set(sale.amount_received_cents),
            ..Default::default()
        };

        let update = SaleReconciler::new()
            .reconcile(&sale, &changes, &lookup)
            .await
            .unwrap();

        assert!(update.recalculated.is_some());
        assert_eq!(lookup.lookups(), 1);
    }
}
