//! # Validation Module
//!
//! Input validation utilities for Tally.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request DTO (serde, deny_unknown_fields)                     │
//! │  ├── Shape and type checks                                             │
//! │  └── Unknown fields rejected                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Ranges, signs, identifiers                                        │
//! │  └── Runs before any storage access                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::MAX_MONEY_CENTS;
use crate::quantity::Quantity;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, category, customer, supplier).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_name;
///
/// assert!(validate_name("name", "Picanha Premium").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a tenant (business) name at signup.
///
/// ## Rules
/// - At least 3 characters
/// - At most 100 characters
/// - Must contain at least one letter or digit, so a slug can be derived
pub fn validate_tenant_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();
    let len = name.chars().count();

    if len < 3 {
        return Err(ValidationError::TooShort {
            field: "tenant name".to_string(),
            min: 3,
        });
    }

    if len > 100 {
        return Err(ValidationError::TooLong {
            field: "tenant name".to_string(),
            max: 100,
        });
    }

    if !name.chars().any(|c| c.is_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "tenant name".to_string(),
            reason: "must contain letters or digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a free-text reason attached to a stock movement.
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    if reason.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.chars().count() > 500 {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: 500,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a basket line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `max`
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POS: Add Item                                                          │
/// │                                                                         │
/// │  Scale reads 1.235 kg                                                   │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(1235, 999000) ← THIS FUNCTION                        │
/// │       │                                                                 │
/// │       ├── qty <= 0?   → Error: "quantity must be positive"             │
/// │       │                                                                 │
/// │       ├── qty > max?  → Error: "quantity must be between 1 and ..."    │
/// │       │                                                                 │
/// │       └── OK → line goes into the basket                               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: Quantity, max: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > max {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: max.milli(),
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (giveaways)
/// - At most [`MAX_MONEY_CENTS`]
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price", 8990).is_ok());
/// assert!(validate_price_cents("price", 0).is_ok());
/// assert!(validate_price_cents("price", -100).is_err());
/// assert!(validate_price_cents("price", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_MONEY_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_MONEY_CENTS,
        });
    }

    Ok(())
}

/// Validates a delivery fee. Same bounds as a price.
pub fn validate_delivery_fee(cents: i64) -> ValidationResult<()> {
    validate_price_cents("delivery fee", cents)
}

/// Validates a stock threshold or opening stock.
pub fn validate_stock_level(field: &str, milli: i64) -> ValidationResult<()> {
    if milli < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates basket size (number of lines).
///
/// ## Rules
/// - Must not exceed `max` (MAX_BASKET_LINES unless configured otherwise)
pub fn validate_basket_size(lines: usize, max: usize) -> ValidationResult<()> {
    if lines > max {
        return Err(ValidationError::OutOfRange {
            field: "basket lines".to_string(),
            min: 1,
            max: max as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_uuid;
///
/// assert!(validate_uuid("product id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("product id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_BASKET_LINES;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Linguiça Toscana").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_tenant_name() {
        assert!(validate_tenant_name("Casa de Carnes").is_ok());
        assert!(validate_tenant_name("ab").is_err());
        assert!(validate_tenant_name("!!!!").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        let max = Quantity::from_units(999);
        assert!(validate_quantity(Quantity::from_milli(1), max).is_ok());
        assert!(validate_quantity(Quantity::from_units(999), max).is_ok());

        assert!(validate_quantity(Quantity::zero(), max).is_err());
        assert!(validate_quantity(Quantity::from_milli(-500), max).is_err());
        assert!(validate_quantity(Quantity::from_milli(999_001), max).is_err());
    }

    #[test]
    fn test_validate_delivery_fee() {
        assert!(validate_delivery_fee(0).is_ok());
        assert!(validate_delivery_fee(1200).is_ok());
        assert!(validate_delivery_fee(-1).is_err());
        assert!(validate_delivery_fee(MAX_MONEY_CENTS).is_ok());
        assert!(validate_delivery_fee(MAX_MONEY_CENTS + 1).is_err());
        assert!(validate_delivery_fee(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_basket_size() {
        assert!(validate_basket_size(MAX_BASKET_LINES, MAX_BASKET_LINES).is_ok());
        assert!(validate_basket_size(MAX_BASKET_LINES + 1, MAX_BASKET_LINES).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }

    #[test]
    fn test_validate_reason() {
        assert!(validate_reason("Stock count").is_ok());
        assert!(validate_reason("  ").is_err());
    }
}
