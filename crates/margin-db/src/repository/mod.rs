//! # Repository Module
//!
//! Database repository implementations for Margin Ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.sales().list(&filter)                                       │
//! │       ▼                                                                 │
//! │  SaleRepository                                                         │
//! │  ├── insert(&self, sale)                                                │
//! │  ├── get_by_id(&self, id)                                               │
//! │  ├── list(&self, filter) / summary(&self, filter)                       │
//! │  ├── apply_update(&self, id, update, now)                               │
//! │  └── delete(&self, id)                                                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Repositories never compute profit; they store what margin-core        │
//! │  decided.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PlatformRepository`](platform::PlatformRepository) - Platform CRUD, default seed, `PlatformLookup`
//! - [`SaleRepository`](sale::SaleRepository) - Sale CRUD, filtered listing, summary

pub mod platform;
pub mod sale;
