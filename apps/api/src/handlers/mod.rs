//! # HTTP Handlers
//!
//! One module per resource. Handlers stay thin: extract, call margin-core or
//! a repository, convert errors with `?`.
//!
//! - [`health`] - liveness and migration status
//! - [`platforms`] - platform CRUD
//! - [`sales`] - sale CRUD, filtered listing, summary, reconciled updates

pub mod health;
pub mod platforms;
pub mod sales;
