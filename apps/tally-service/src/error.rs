//! # API Error Type
//!
//! Unified error type for service commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally                                  │
//! │                                                                         │
//! │  Command Function ── Result<T, ApiError>                                │
//! │         │                                                               │
//! │         ├── CoreError (validation, basket, tenant token)                │
//! │         │      └── mapped 1:1 onto a caller-facing code                 │
//! │         │                                                               │
//! │         ├── DbError::Domain(CoreError) ── same mapping                  │
//! │         │                                                               │
//! │         └── DbError (storage) ── logged with detail,                    │
//! │                                  caller gets STORAGE_FAILURE            │
//! │                                                                         │
//! │  Caller receives:                                                       │
//! │    { "code": "NOT_FOUND",                                               │
//! │      "message": "Product not found: 9f1c..." }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tally_core::{CoreError, Quantity};
use tally_db::DbError;
use tracing::error;
use ts_rs::TS;

/// Error returned from every command.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 9f1c2a4e-..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No tenant token on the request
    MissingTenant,

    /// The token names no tenant
    UnknownTenant,

    /// Sale requested without lines
    EmptyBasket,

    /// Product, customer, user or sale outside the tenant (or missing)
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Sale would take stock below zero under `reject_negative`
    InsufficientStock,

    /// Storage failed or was busy; nothing was committed
    StorageFailure,

    /// Internal error
    Internal,
}

/// Result type for commands.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unknown_tenant() -> Self {
        ApiError::new(ErrorCode::UnknownTenant, "Unknown tenant")
    }

    fn storage(detail: &str, message: &str) -> Self {
        error!(detail = %detail, "{}", message);
        ApiError::new(ErrorCode::StorageFailure, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => ApiError::from(core),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => ApiError::storage(&e, "Database connection failed"),
            DbError::MigrationFailed(e) => ApiError::storage(&e, "Database migration failed"),
            DbError::QueryFailed(e) => ApiError::storage(&e, "Database operation failed"),
            DbError::TransactionFailed(e) => ApiError::storage(&e, "Database transaction failed"),
            DbError::PoolExhausted => ApiError::storage("pool exhausted", "Database is busy"),
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::Internal, "Internal error")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingTenant => {
                ApiError::new(ErrorCode::MissingTenant, "Tenant context is required")
            }
            CoreError::EmptyBasket => ApiError::new(ErrorCode::EmptyBasket, "Basket is empty"),
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::CustomerNotFound(id) => ApiError::not_found("Customer", &id),
            CoreError::ActorNotFound(id) => ApiError::not_found("User", &id),
            CoreError::InsufficientStock {
                product,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    product,
                    Quantity::from_milli(available),
                    Quantity::from_milli(requested)
                ),
            ),
            err @ CoreError::InvalidMovement { .. } => ApiError::validation(err.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Malformed request bodies are validation errors.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::validation(format!("Invalid request: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::ValidationError;

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(CoreError::MissingTenant);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "MISSING_TENANT");
        assert_eq!(json["message"], "Tenant context is required");

        let json = serde_json::to_value(ApiError::unknown_tenant()).unwrap();
        assert_eq!(json["code"], "UNKNOWN_TENANT");
    }

    #[test]
    fn test_domain_errors_pass_through_db_layer() {
        let err = ApiError::from(DbError::Domain(CoreError::ProductNotFound("p-1".into())));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: p-1");

        let err = ApiError::from(DbError::Domain(CoreError::EmptyBasket));
        assert_eq!(err.code, ErrorCode::EmptyBasket);
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let err = ApiError::from(DbError::QueryFailed(
            "database is locked: SELECT * FROM sales".into(),
        ));
        assert_eq!(err.code, ErrorCode::StorageFailure);
        assert!(!err.message.contains("sales"));
    }

    #[test]
    fn test_insufficient_stock_message_uses_units() {
        let err = ApiError::from(CoreError::InsufficientStock {
            product: "Costela Gaúcha".into(),
            available: 2_000,
            requested: 3_500,
        });
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(
            err.message,
            "Insufficient stock for Costela Gaúcha: 2.000 available, 3.500 requested"
        );
    }

    #[test]
    fn test_validation_codes() {
        let err = ApiError::from(CoreError::Validation(ValidationError::MustBePositive {
            field: "quantity".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = ApiError::from(DbError::UniqueViolation {
            field: "slug".into(),
            value: "casa-de-carnes".into(),
        });
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
