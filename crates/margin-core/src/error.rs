//! # Error Types
//!
//! Domain-specific error types for margin-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  margin-core errors (this file)                                         │
//! │  ├── CoreError          - Business rule failures                        │
//! │  ├── ValidationError    - Input validation failures                     │
//! │  └── ReconcileError<E>  - CoreError OR the platform lookup's own error  │
//! │                                                                         │
//! │  margin-db errors (separate crate)                                      │
//! │  └── DbError            - Database operation failures                   │
//! │                                                                         │
//! │  API errors (in app)                                                    │
//! │  └── ApiError           - What the browser sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ReconcileError → ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, ID)
//! 3. Errors are enum variants, never String
//! 4. Storage failures pass through untouched; the core never retries

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is terminal for the request that produced it. Callers pick a
/// transport status by matching on the variant.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Platform cannot be found.
    ///
    /// ## When This Occurs
    /// - A sale is created against an unknown platform id
    /// - An update moves a sale to an unknown platform id
    /// - A financial update hits a sale whose platform was deleted
    ///
    /// In every case nothing is written.
    #[error("Platform not found: {0}")]
    PlatformNotFound(String),

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for the two "not found" variants.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::PlatformNotFound(_) | CoreError::SaleNotFound(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Only the first failing field is ever reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A monetary or percentage value is below zero.
    #[error("{field} must be a non-negative number")]
    Negative { field: String },

    /// A monetary or percentage value is above its ceiling.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: i64 },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::Negative { field }
            | ValidationError::TooLarge { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Reconcile Error
// =============================================================================

/// Failure of an operation that consults a [`PlatformLookup`].
///
/// The lookup's own error type is carried as-is so storage failures can be
/// told apart from business failures without string matching.
///
/// [`PlatformLookup`]: crate::reconcile::PlatformLookup
#[derive(Debug, Error)]
pub enum ReconcileError<E>
where
    E: std::error::Error + 'static,
{
    /// Business rule or validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The platform lookup itself failed.
    #[error("Platform lookup failed: {0}")]
    Lookup(#[source] E),
}

impl<E> From<ValidationError> for ReconcileError<E>
where
    E: std::error::Error + 'static,
{
    fn from(err: ValidationError) -> Self {
        ReconcileError::Core(CoreError::Validation(err))
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::PlatformNotFound("p-404".to_string());
        assert_eq!(err.to_string(), "Platform not found: p-404");
        assert!(err.is_not_found());

        let err = CoreError::SaleNotFound("s-1".to_string());
        assert_eq!(err.to_string(), "Sale not found: s-1");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Negative {
            field: "amount_received".to_string(),
        };
        assert_eq!(err.to_string(), "amount_received must be a non-negative number");
        assert_eq!(err.field(), "amount_received");

        let err = ValidationError::Required {
            field: "origin_channel".to_string(),
        };
        assert_eq!(err.to_string(), "origin_channel is required");
        assert_eq!(err.field(), "origin_channel");

        let err = ValidationError::TooLarge {
            field: "commission_percent".to_string(),
            max: 1_000_000,
        };
        assert_eq!(err.to_string(), "commission_percent must be at most 1000000");
        assert_eq!(err.field(), "commission_percent");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "platform_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(!core_err.is_not_found());
    }

    #[test]
    fn test_reconcile_error_keeps_lookup_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: ReconcileError<std::io::Error> = ReconcileError::Lookup(io);
        assert_eq!(err.to_string(), "Platform lookup failed: disk gone");
        assert!(err.source().is_some());

        let err: ReconcileError<std::io::Error> = ValidationError::Negative {
            field: "shipping_cost".to_string(),
        }
        .into();
        assert!(matches!(err, ReconcileError::Core(CoreError::Validation(_))));
    }
}
