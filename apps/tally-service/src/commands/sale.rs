//! # Sale Commands
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create_sale                                       │
//! │                                                                         │
//! │  token ──► parse_token          MISSING_TENANT     ┐                    │
//! │  request ──► Basket::new        EMPTY_BASKET /     │ no storage access  │
//! │                                 VALIDATION_ERROR   ┘                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TenantResolver::confirm        UNKNOWN_TENANT                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleRepository::record_sale    NOT_FOUND / INSUFFICIENT_STOCK /        │
//! │  (one transaction)              STORAGE_FAILURE, nothing committed      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleReceipt                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices are never taken from the request; the engine re-reads them.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::commands::page_limit;
use crate::context::parse_token;
use crate::error::{ApiError, ApiResult};
use crate::state::App;
use tally_core::{
    Basket, BasketLimits, BasketLine, CoreResult, DeliveryMode, Money, PaymentMethod, Quantity,
    Sale, SaleItem, SaleReceipt,
};

/// One basket line as sent by the caller.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SaleLineRequest {
    pub product_id: String,
    /// Decimal units; `0.750` is 750 g of a `kg` product.
    #[ts(type = "number")]
    pub quantity: Quantity,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSaleRequest {
    /// User performing the sale.
    pub actor_id: String,
    pub items: Vec<SaleLineRequest>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub delivery_mode: DeliveryMode,
    /// Ignored for pickup.
    #[serde(default)]
    pub delivery_fee_cents: i64,
    #[serde(default)]
    pub customer_id: Option<String>,
}

impl CreateSaleRequest {
    /// Validates the request into a basket. Touches no storage.
    pub fn into_basket(self, limits: BasketLimits) -> CoreResult<Basket> {
        let lines = self
            .items
            .into_iter()
            .map(|item| BasketLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect();

        Basket::new(
            lines,
            self.payment_method,
            self.delivery_mode,
            Money::from_cents(self.delivery_fee_cents),
            self.customer_id,
            limits,
        )
    }
}

/// A stored sale with its items.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Records a sale.
pub async fn create_sale(
    app: &App,
    token: Option<&str>,
    request: CreateSaleRequest,
) -> ApiResult<SaleReceipt> {
    let tenant_id = parse_token(token)?;
    let actor_id = request.actor_id.clone();

    debug!(tenant_id = %tenant_id, lines = request.items.len(), "create_sale command");

    let basket = request
        .into_basket(app.config().basket_limits())
        .map_err(|err| {
            warn!(tenant_id = %tenant_id, error = %err, "Sale rejected before storage");
            ApiError::from(err)
        })?;

    let ctx = app.resolver().confirm(tenant_id).await?;

    let receipt = app.sales().record_sale(&ctx.id, &actor_id, &basket).await?;
    Ok(receipt)
}

pub async fn get_sale(app: &App, token: Option<&str>, sale_id: &str) -> ApiResult<SaleDetail> {
    let ctx = app.resolver().resolve(token).await?;
    let sales = app.db().sales();

    let sale = sales
        .get(&ctx.id, sale_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", sale_id))?;
    let items = sales.items(&ctx.id, sale_id).await?;

    Ok(SaleDetail { sale, items })
}

/// Latest sales, newest first. Defaults to the dashboard size.
pub async fn recent_sales(
    app: &App,
    token: Option<&str>,
    limit: Option<u32>,
) -> ApiResult<Vec<Sale>> {
    let ctx = app.resolver().resolve(token).await?;
    let config = app.config();
    let limit = page_limit(limit, config.recent_sales, config.history_limit);

    Ok(app.db().sales().list_recent(&ctx.id, limit).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::parse_request;
    use crate::commands::test_support::{fixture, fixture_with, product};
    use crate::config::ServiceConfig;
    use crate::error::ErrorCode;
    use tally_core::StockPolicy;

    fn request(actor: &str, items: serde_json::Value) -> CreateSaleRequest {
        serde_json::from_value(serde_json::json!({
            "actorId": actor,
            "items": items,
            "paymentMethod": "cash",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let fx = fixture().await;
        let picanha = product(&fx, "Picanha Premium", 8990, None, 50.0).await;

        let receipt = create_sale(
            &fx.app,
            Some(&fx.token),
            request(
                &fx.admin_id,
                serde_json::json!([{ "productId": picanha.id, "quantity": 2 }]),
            ),
        )
        .await
        .unwrap();
        assert_eq!(receipt.total_amount_cents, 17980);

        let detail = get_sale(&fx.app, Some(&fx.token), &receipt.sale_id)
            .await
            .unwrap();
        assert_eq!(detail.sale.receipt_number, receipt.receipt_number);
        assert_eq!(detail.items.len(), 1);

        let recent = recent_sales(&fx.app, Some(&fx.token), None).await.unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[tokio::test]
    async fn test_weight_based_delivery_sale_from_json() {
        let fx = fixture().await;
        let linguica = product(&fx, "Linguiça Toscana", 2490, None, 10.0).await;

        let body = format!(
            r#"{{
                "actorId": "{}",
                "items": [{{ "productId": "{}", "quantity": 0.75 }}],
                "paymentMethod": "pix",
                "deliveryMode": "delivery",
                "deliveryFeeCents": 800
            }}"#,
            fx.admin_id, linguica.id
        );
        let request: CreateSaleRequest = parse_request(&body).unwrap();

        let receipt = create_sale(&fx.app, Some(&fx.token), request).await.unwrap();
        assert_eq!(receipt.items[0].quantity_milli, 750);
        assert_eq!(receipt.items[0].subtotal_cents, 1868);
        assert_eq!(receipt.total_amount_cents, 1868 + 800);
    }

    #[tokio::test]
    async fn test_missing_tenant_and_empty_basket() {
        let fx = fixture().await;

        let err = create_sale(&fx.app, None, request(&fx.admin_id, serde_json::json!([])))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingTenant);

        let err = create_sale(
            &fx.app,
            Some(&fx.token),
            request(&fx.admin_id, serde_json::json!([])),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyBasket);
    }

    #[tokio::test]
    async fn test_unknown_tenant_and_missing_product() {
        let fx = fixture().await;
        let picanha = product(&fx, "Picanha Premium", 8990, None, 50.0).await;

        let err = create_sale(
            &fx.app,
            Some("00000000-0000-4000-8000-000000000000"),
            request(
                &fx.admin_id,
                serde_json::json!([{ "productId": picanha.id, "quantity": 1 }]),
            ),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTenant);

        let err = create_sale(
            &fx.app,
            Some(&fx.token),
            request(
                &fx.admin_id,
                serde_json::json!([
                    { "productId": picanha.id, "quantity": 1 },
                    { "productId": "99999999-9999-4999-8999-999999999999", "quantity": 1 }
                ]),
            ),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let stored = fx
            .app
            .db()
            .catalog()
            .get_product(&crate::context::parse_token(Some(&fx.token)).unwrap(), &picanha.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.stock_milli, 50_000);
    }

    #[tokio::test]
    async fn test_quantity_limits_from_config() {
        let config = ServiceConfig {
            max_item_quantity: Quantity::from_units(10),
            ..ServiceConfig::default()
        };
        let fx = fixture_with(config).await;
        let carvao = product(&fx, "Carvão 5kg", 1500, None, 100.0).await;

        let err = create_sale(
            &fx.app,
            Some(&fx.token),
            request(
                &fx.admin_id,
                serde_json::json!([{ "productId": carvao.id, "quantity": 11 }]),
            ),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = create_sale(
            &fx.app,
            Some(&fx.token),
            request(
                &fx.admin_id,
                serde_json::json!([{ "productId": carvao.id, "quantity": 0 }]),
            ),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_configured_stock_policy_applies() {
        let config = ServiceConfig {
            stock_policy: StockPolicy::RejectNegative,
            ..ServiceConfig::default()
        };
        let fx = fixture_with(config).await;
        let costela = product(&fx, "Costela Gaúcha", 3990, Some(3490), 2.0).await;

        let err = create_sale(
            &fx.app,
            Some(&fx.token),
            request(
                &fx.admin_id,
                serde_json::json!([{ "productId": costela.id, "quantity": 3 }]),
            ),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[tokio::test]
    async fn test_oversized_delivery_fee_rejected() {
        let fx = fixture().await;
        let carvao = product(&fx, "Carvão 5kg", 1500, None, 10.0).await;

        let request: CreateSaleRequest = serde_json::from_value(serde_json::json!({
            "actorId": fx.admin_id,
            "items": [{ "productId": carvao.id, "quantity": 1 }],
            "paymentMethod": "cash",
            "deliveryMode": "delivery",
            "deliveryFeeCents": i64::MAX,
        }))
        .unwrap();

        let err = create_sale(&fx.app, Some(&fx.token), request).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(recent_sales(&fx.app, Some(&fx.token), None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_zero_history_limit_still_lists() {
        let config = ServiceConfig {
            history_limit: 0,
            ..ServiceConfig::default()
        };
        let fx = fixture_with(config).await;
        let carvao = product(&fx, "Carvão 5kg", 1500, None, 10.0).await;

        for _ in 0..2 {
            create_sale(
                &fx.app,
                Some(&fx.token),
                request(
                    &fx.admin_id,
                    serde_json::json!([{ "productId": carvao.id, "quantity": 1 }]),
                ),
            )
            .await
            .unwrap();
        }

        let recent = recent_sales(&fx.app, Some(&fx.token), Some(10)).await.unwrap();
        assert_eq!(recent.len(), 1);
    }
}
