//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors                                                        │
//! │  └── DbError          - Storage failures (wraps CoreError as Domain)   │
//! │                                                                         │
//! │  tally-service errors                                                   │
//! │  └── ApiError         - What the caller sees (code + message)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Caller       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is fatal to the single operation that raised it. None of
/// them are retried internally.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No tenant context was supplied with the request.
    ///
    /// ## When This Occurs
    /// - Tenant token absent or blank
    ///
    /// Raised before any storage access.
    #[error("Tenant context is required")]
    MissingTenant,

    /// A sale was attempted with zero basket lines.
    #[error("Basket is empty")]
    EmptyBasket,

    /// Product does not exist for the active tenant.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist
    /// - Product ID belongs to a different tenant
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Customer does not exist for the active tenant.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Acting user does not exist for the active tenant.
    #[error("User not found: {0}")]
    ActorNotFound(String),

    /// Stock would drop below zero while the stock policy forbids it.
    ///
    /// ## User Workflow
    /// ```text
    /// Basket: Picanha 3 kg
    ///      │
    ///      ▼
    /// Check stock (RejectNegative): available 2.000
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Picanha", available: 2000, requested: 3000 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Manual stock movement is inconsistent (wrong sign, reserved type).
    #[error("Invalid stock movement: {reason}")]
    InvalidMovement { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
