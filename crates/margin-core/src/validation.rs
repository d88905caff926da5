//! # Validation Module
//!
//! Input validation utilities for Margin Ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser form                                                  │
//! │  └── Required fields, numeric inputs                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API extractor (Rust)                                          │
//! │  ├── Type validation (deserialization: "abc" is not an integer)         │
//! │  └── THIS MODULE: Business rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  └── NOT NULL / CHECK constraints                                       │
//! │                                                                         │
//! │  The first failing field is reported; errors are never aggregated.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use margin_core::validation::{validate_non_negative, validate_required_text};
//!
//! assert!(validate_non_negative("shipping_cost", 0).is_ok());
//! assert!(validate_non_negative("shipping_cost", -1).is_err());
//!
//! let origin = validate_required_text("origin_channel", "  Instagram ", 100).unwrap();
//! assert_eq!(origin, "Instagram");
//! ```

use crate::error::ValidationError;
use crate::patch::Patch;
use crate::types::{NewPlatform, PlatformChanges};
use crate::{MAX_COMMISSION_BPS, MAX_DESCRIPTION_LEN, MAX_MONEY_CENTS, MAX_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that a cents or basis-point value is not negative.
///
/// ## Example
/// ```rust
/// use margin_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("amount_received", 0).is_ok());
/// assert!(validate_non_negative("amount_received", 15000).is_ok());
/// assert!(validate_non_negative("amount_received", -100).is_err());
/// ```
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates that a value lies in `0..=max`.
///
/// Negative values fail first, so a negative amount always reports
/// `Negative` whatever the ceiling.
pub fn validate_in_range(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    validate_non_negative(field, value)?;

    if value > max {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an amount or cost in cents: `0..=MAX_MONEY_CENTS`.
pub fn validate_money(field: &str, value: i64) -> ValidationResult<()> {
    validate_in_range(field, value, MAX_MONEY_CENTS)
}

/// Validates a commission in basis points: `0..=MAX_COMMISSION_BPS`.
pub fn validate_commission(field: &str, value: i64) -> ValidationResult<()> {
    validate_in_range(field, value, MAX_COMMISSION_BPS)
}

/// Validates an optional amount, then defaults it to zero.
pub fn money_or_zero(field: &str, value: Option<i64>) -> ValidationResult<i64> {
    let value = value.unwrap_or(0);
    validate_money(field, value)?;
    Ok(value)
}

/// Validates an amount that must be present.
pub fn required_money(field: &str, value: Option<i64>) -> ValidationResult<i64> {
    let value = value.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;
    validate_money(field, value)?;
    Ok(value)
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must not exceed `max` characters
///
/// ## Returns
/// The trimmed value.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Normalizes an optional description.
///
/// Trims it; blank becomes `None`.
///
/// ## Example
/// ```rust
/// use margin_core::validation::normalize_description;
///
/// assert_eq!(normalize_description(Some("  Vase ".into())).unwrap(), Some("Vase".into()));
/// assert_eq!(normalize_description(Some("   ".into())).unwrap(), None);
/// assert_eq!(normalize_description(None).unwrap(), None);
/// ```
pub fn normalize_description(value: Option<String>) -> ValidationResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    if value.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(Some(value.to_string()))
}

// =============================================================================
// Platform Validators
// =============================================================================

/// Validated platform fields, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPlatform {
    pub name: String,
    pub fixed_fee_cents: i64,
    pub commission_bps: i64,
}

/// Validates a platform creation payload.
///
/// ## Rules
/// - name: required, trimmed, at most [`MAX_NAME_LEN`] characters
/// - fixed fee: default 0, `0..=MAX_MONEY_CENTS`
/// - commission: default 0, `0..=MAX_COMMISSION_BPS`
pub fn validate_new_platform(input: &NewPlatform) -> ValidationResult<ValidPlatform> {
    let name = validate_required_text("name", &input.name, MAX_NAME_LEN)?;
    let fixed_fee_cents = money_or_zero("fixed_fee", input.fixed_fee_cents)?;
    let commission_bps = input.commission_bps.unwrap_or(0);
    validate_commission("commission_percent", commission_bps)?;

    Ok(ValidPlatform {
        name,
        fixed_fee_cents,
        commission_bps,
    })
}

/// Validates a platform update payload, applying the creation rules to every
/// supplied field. Returns the changes with the name trimmed.
pub fn validate_platform_changes(changes: &PlatformChanges) -> ValidationResult<PlatformChanges> {
    let name = match &changes.name {
        Patch::Set(name) => Patch::Set(validate_required_text("name", name, MAX_NAME_LEN)?),
        Patch::Unset => Patch::Unset,
    };

    if let Patch::Set(fee) = changes.fixed_fee_cents {
        validate_money("fixed_fee", fee)?;
    }
    if let Patch::Set(commission) = changes.commission_bps {
        validate_commission("commission_percent", commission)?;
    }

    Ok(PlatformChanges {
        name,
        fixed_fee_cents: changes.fixed_fee_cents,
        commission_bps: changes.commission_bps,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("x", 0).is_ok());
        assert!(validate_non_negative("x", i64::MAX).is_ok());

        let err = validate_non_negative("printing_cost", -1).unwrap_err();
        assert_eq!(err.field(), "printing_cost");
        assert!(matches!(err, ValidationError::Negative { .. }));
    }

    #[test]
    fn test_required_money() {
        assert_eq!(required_money("amount_received", Some(0)).unwrap(), 0);
        assert!(matches!(
            required_money("amount_received", None).unwrap_err(),
            ValidationError::Required { .. }
        ));
        assert!(matches!(
            required_money("amount_received", Some(-5)).unwrap_err(),
            ValidationError::Negative { .. }
        ));
        assert!(matches!(
            required_money("amount_received", Some(MAX_MONEY_CENTS + 1)).unwrap_err(),
            ValidationError::TooLarge { .. }
        ));
        assert_eq!(money_or_zero("shipping_cost", None).unwrap(), 0);
    }

    #[test]
    fn test_ceilings() {
        assert!(validate_money("printing_cost", MAX_MONEY_CENTS).is_ok());
        assert!(validate_commission("commission_percent", MAX_COMMISSION_BPS).is_ok());

        let err = validate_commission("commission_percent", MAX_COMMISSION_BPS + 1).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                field: "commission_percent".to_string(),
                max: MAX_COMMISSION_BPS,
            }
        );

        // Sign is checked before the ceiling.
        assert!(matches!(
            validate_in_range("fixed_fee", -1, 10).unwrap_err(),
            ValidationError::Negative { .. }
        ));
    }

    #[test]
    fn test_validate_required_text() {
        assert_eq!(validate_required_text("origin_channel", " Feira ", 10).unwrap(), "Feira");
        assert!(validate_required_text("origin_channel", "   ", 10).is_err());
        assert!(validate_required_text("origin_channel", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn test_validate_new_platform_defaults() {
        let platform = validate_new_platform(&NewPlatform {
            name: "  Etsy ".to_string(),
            fixed_fee_cents: None,
            commission_bps: None,
        })
        .unwrap();

        assert_eq!(platform.name, "Etsy");
        assert_eq!(platform.fixed_fee_cents, 0);
        assert_eq!(platform.commission_bps, 0);
    }

    #[test]
    fn test_validate_new_platform_rejects() {
        let err = validate_new_platform(&NewPlatform::default()).unwrap_err();
        assert_eq!(err.field(), "name");

        let err = validate_new_platform(&NewPlatform {
            name: "Etsy".to_string(),
            fixed_fee_cents: Some(100),
            commission_bps: Some(-1),
        })
        .unwrap_err();
        assert_eq!(err.field(), "commission_percent");

        let err = validate_new_platform(&NewPlatform {
            name: "Etsy".to_string(),
            fixed_fee_cents: Some(1_000_000_000_000_000),
            commission_bps: None,
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        assert_eq!(err.field(), "fixed_fee");
    }

    #[test]
    fn test_validate_platform_changes() {
        let changes = PlatformChanges {
            name: Patch::Set(" Elo7 ".to_string()),
            ..Default::default()
        };
        let valid = validate_platform_changes(&changes).unwrap();
        assert_eq!(valid.name, Patch::Set("Elo7".to_string()));
        assert!(valid.fixed_fee_cents.is_unset());

        let changes = PlatformChanges {
            fixed_fee_cents: Patch::Set(-10),
            ..Default::default()
        };
        assert_eq!(validate_platform_changes(&changes).unwrap_err().field(), "fixed_fee");

        let changes = PlatformChanges {
            commission_bps: Patch::Set(MAX_COMMISSION_BPS + 1),
            ..Default::default()
        };
        assert_eq!(
            validate_platform_changes(&changes).unwrap_err().field(),
            "commission_percent"
        );
    }
}
