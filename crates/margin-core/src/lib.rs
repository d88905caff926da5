//! # margin-core: Pure Business Logic for Margin Ledger
//!
//! This crate is the **heart** of Margin Ledger. It decides what a sale
//! earns and what an edit to a sale writes, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Margin Ledger Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser UI                                   │   │
//! │  │    Sale form ──► Sales list + filters ──► Totals row            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST (JSON)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    margin-api (axum)                            │   │
//! │  │    POST /api/sales, PATCH /api/sales/{id}, GET /summary, ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ margin-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │  profit   │  │ reconcile │  │  summary  │  │   │
//! │  │   │   Money   │  │  Profit   │  │   Sale    │  │  Sales    │  │   │
//! │  │   │  Percent  │  │Calculator │  │Reconciler │  │  Summary  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ PlatformLookup (trait)                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    margin-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Platform, Sale, payloads, filters)
//! - [`money`] - Money and Percent with integer arithmetic (no floating point!)
//! - [`patch`] - `Patch<T>` for sparse updates
//! - [`profit`] - Platform fee, net profit and margin
//! - [`reconcile`] - Sale creation and partial-update reconciliation
//! - [`summary`] - Totals over a list of sales
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Same input = same output; ids and clocks are passed in
//! 2. **No I/O**: Storage is reached only through the `PlatformLookup` trait
//! 3. **Integer Money**: Cents and basis points, rounded once at the boundary
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use margin_core::money::{Money, Percent};
//! use margin_core::profit::{ProfitCalculator, ProfitInput};
//!
//! let result = ProfitCalculator::compute(&ProfitInput {
//!     amount_received: Money::from_cents(20000),
//!     printing_cost: Money::from_cents(4000),
//!     fixed_fee: Money::from_cents(600),
//!     commission: Percent::from_bps(1500),
//!     shipping_cost: Money::from_cents(2000),
//! })
//! .unwrap();
//!
//! assert_eq!(result.net_profit.cents(), 10400);
//! assert_eq!(result.profit_margin.bps(), 5200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod patch;
pub mod profit;
pub mod reconcile;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ReconcileError, ValidationError};
pub use money::{Money, Percent};
pub use patch::Patch;
pub use profit::{ProfitBreakdown, ProfitCalculator, ProfitInput};
pub use reconcile::{PlatformLookup, SaleReconciler, SaleUpdate};
pub use summary::SalesSummary;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of short text fields (platform name, origin channel, ids).
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a sale description.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Ceiling for any stored amount or cost, in cents.
///
/// Keeps every derived figure (fee, net profit, margin in basis points)
/// inside `i64` for all accepted inputs.
pub const MAX_MONEY_CENTS: i64 = 10_000_000_000_000;

/// Ceiling for a platform commission, in basis points (10 000 %).
pub const MAX_COMMISSION_BPS: i64 = 1_000_000;
