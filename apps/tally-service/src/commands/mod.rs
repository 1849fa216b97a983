//! # Commands Module
//!
//! Every operation exposed to the request layer.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports, JSON parsing)
//! ├── tenant.rs     ◄─── Signup, users, public storefront
//! ├── catalog.rs    ◄─── Products, categories, suppliers
//! ├── customer.rs   ◄─── Customers and their spend
//! ├── sale.rs       ◄─── Sale engine entry point
//! ├── inventory.rs  ◄─── Manual stock movements, ledger history
//! └── stats.rs      ◄─── Dashboard and daily summary
//! ```
//!
//! ## Shape of a Command
//! ```rust,ignore
//! pub async fn create_sale(
//!     app: &App,                  // database + config
//!     token: Option<&str>,        // tenant token from the caller
//!     request: CreateSaleRequest, // typed, deny_unknown_fields
//! ) -> ApiResult<SaleReceipt>
//! ```
//!
//! Hosts that receive raw JSON call [`parse_request`] first; an unknown or
//! malformed field becomes `VALIDATION_ERROR` before anything else runs.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{ApiError, ApiResult};

pub mod catalog;
pub mod customer;
pub mod inventory;
pub mod sale;
pub mod stats;
pub mod tenant;

/// Deserializes a request body.
pub fn parse_request<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(|err| {
        warn!(error = %err, "Request rejected: malformed body");
        ApiError::from(err)
    })
}

/// Page size for list reads: `requested` or `default`, at least 1 and at
/// most `cap`. A zero cap still yields one row.
pub(crate) fn page_limit(requested: Option<u32>, default: u32, cap: u32) -> u32 {
    requested.unwrap_or(default).max(1).min(cap.max(1))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use sale::CreateSaleRequest;

    #[test]
    fn test_parse_request_rejects_unknown_fields() {
        let err = parse_request::<CreateSaleRequest>(
            r#"{"actorId":"a","items":[],"paymentMethod":"cash","unitPriceCents":1}"#,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = parse_request::<CreateSaleRequest>("not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_page_limit_bounds() {
        assert_eq!(page_limit(None, 5, 100), 5);
        assert_eq!(page_limit(Some(0), 5, 100), 1);
        assert_eq!(page_limit(Some(500), 5, 100), 100);
        assert_eq!(page_limit(None, 5, 0), 1);
        assert_eq!(page_limit(Some(0), 0, 0), 1);
    }
}
