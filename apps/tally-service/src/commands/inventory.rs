//! # Inventory Commands
//!
//! Manual stock movements and ledger reads. Sale movements never come
//! through here; the sale engine writes them.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::commands::page_limit;
use crate::error::ApiResult;
use crate::state::App;
use tally_core::{InventoryHistoryEntry, LedgerBalance, MovementType, Quantity};

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdjustStockRequest {
    pub product_id: String,
    pub actor_id: String,
    /// Signed decimal units; positive for entries, negative for exits.
    #[ts(type = "number")]
    pub quantity_change: Quantity,
    pub movement_type: MovementType,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockResponse {
    pub product_id: String,
    #[ts(type = "number")]
    pub new_stock: Quantity,
}

pub async fn adjust_stock(
    app: &App,
    token: Option<&str>,
    request: AdjustStockRequest,
) -> ApiResult<AdjustStockResponse> {
    let ctx = app.resolver().resolve(token).await?;
    debug!(
        tenant_id = %ctx.id,
        product_id = %request.product_id,
        movement_type = request.movement_type.as_str(),
        "adjust_stock command"
    );

    let new_stock = app
        .db()
        .inventory()
        .manual_adjust(
            &ctx.id,
            &request.product_id,
            &request.actor_id,
            request.quantity_change,
            request.movement_type,
            &request.reason,
        )
        .await?;

    Ok(AdjustStockResponse {
        product_id: request.product_id,
        new_stock,
    })
}

/// Ledger entries, newest first, capped at the configured history limit.
pub async fn inventory_history(
    app: &App,
    token: Option<&str>,
    limit: Option<u32>,
) -> ApiResult<Vec<InventoryHistoryEntry>> {
    let ctx = app.resolver().resolve(token).await?;
    let limit = page_size(app, limit);
    Ok(app.db().inventory().history(&ctx.id, limit).await?)
}

pub async fn product_history(
    app: &App,
    token: Option<&str>,
    product_id: &str,
    limit: Option<u32>,
) -> ApiResult<Vec<InventoryHistoryEntry>> {
    let ctx = app.resolver().resolve(token).await?;
    let limit = page_size(app, limit);
    Ok(app
        .db()
        .inventory()
        .product_history(&ctx.id, product_id, limit)
        .await?)
}

/// Stock against opening stock plus the ledger, for audits.
pub async fn ledger_balance(
    app: &App,
    token: Option<&str>,
    product_id: &str,
) -> ApiResult<LedgerBalance> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app.db().inventory().balance(&ctx.id, product_id).await?)
}

fn page_size(app: &App, requested: Option<u32>) -> u32 {
    let cap = app.config().history_limit;
    page_limit(requested, cap, cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{fixture, product};
    use crate::error::ErrorCode;

    fn adjust(fx_admin: &str, product_id: &str, change: f64, kind: &str) -> AdjustStockRequest {
        serde_json::from_value(serde_json::json!({
            "productId": product_id,
            "actorId": fx_admin,
            "quantityChange": change,
            "movementType": kind,
            "reason": "Conferência de estoque",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_adjust_then_history_and_balance() {
        let fx = fixture().await;
        let token = Some(fx.token.as_str());
        let picanha = product(&fx, "Picanha Premium", 8990, None, 10.0).await;

        let response = adjust_stock(&fx.app, token, adjust(&fx.admin_id, &picanha.id, 4.25, "entry"))
            .await
            .unwrap();
        assert_eq!(response.new_stock, Quantity::from_milli(14_250));

        let history = inventory_history(&fx.app, token, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].product_name, "Picanha Premium");

        let balance = ledger_balance(&fx.app, token, &picanha.id).await.unwrap();
        assert!(balance.is_balanced());

        let per_product = product_history(&fx.app, token, &picanha.id, Some(10))
            .await
            .unwrap();
        assert_eq!(per_product.len(), 1);
    }

    #[tokio::test]
    async fn test_sale_type_and_wrong_sign_rejected() {
        let fx = fixture().await;
        let token = Some(fx.token.as_str());
        let picanha = product(&fx, "Picanha Premium", 8990, None, 10.0).await;

        let err = adjust_stock(&fx.app, token, adjust(&fx.admin_id, &picanha.id, -1.0, "sale"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = adjust_stock(&fx.app, token, adjust(&fx.admin_id, &picanha.id, 1.0, "exit"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert!(inventory_history(&fx.app, token, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let fx = fixture().await;
        let err = adjust_stock(
            &fx.app,
            Some(&fx.token),
            adjust(&fx.admin_id, "99999999-9999-4999-8999-999999999999", 1.0, "entry"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
