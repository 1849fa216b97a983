//! # Stats Commands
//!
//! Dashboard figures are recomputed on every call. Days are UTC calendar
//! days.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::App;
use tally_core::{DailySummary, DashboardStats, Product};

/// Today's revenue, low-stock count and the latest sales.
pub async fn dashboard(app: &App, token: Option<&str>) -> ApiResult<DashboardStats> {
    let ctx = app.resolver().resolve(token).await?;
    let today = Utc::now().date_naive();
    debug!(tenant_id = %ctx.id, %today, "dashboard command");

    Ok(app
        .db()
        .stats()
        .dashboard(&ctx.id, today, app.config().recent_sales)
        .await?)
}

/// Sale count, revenue and delivery fees for `day` (default today).
pub async fn daily_summary(
    app: &App,
    token: Option<&str>,
    day: Option<NaiveDate>,
) -> ApiResult<DailySummary> {
    let ctx = app.resolver().resolve(token).await?;
    let day = day.unwrap_or_else(|| Utc::now().date_naive());
    Ok(app.db().stats().daily_summary(&ctx.id, day).await?)
}

pub async fn low_stock(app: &App, token: Option<&str>) -> ApiResult<Vec<Product>> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app.db().stats().low_stock_products(&ctx.id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sale::{create_sale, CreateSaleRequest};
    use crate::commands::test_support::{fixture, product};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_dashboard_reflects_committed_sale() {
        let fx = fixture().await;
        let token = Some(fx.token.as_str());
        let carvao = product(&fx, "Carvão 5kg", 1500, None, 6.0).await;

        let request: CreateSaleRequest = serde_json::from_value(serde_json::json!({
            "actorId": fx.admin_id,
            "items": [{ "productId": carvao.id, "quantity": 2 }],
            "paymentMethod": "cash",
            "deliveryMode": "delivery",
            "deliveryFeeCents": 1000,
        }))
        .unwrap();
        create_sale(&fx.app, token, request).await.unwrap();

        let stats = dashboard(&fx.app, token).await.unwrap();
        assert_eq!(stats.daily_revenue_cents, 4000);
        assert_eq!(stats.low_stock_count, 1);
        assert_eq!(stats.recent_sales.len(), 1);

        let summary = daily_summary(&fx.app, token, None).await.unwrap();
        assert_eq!(summary.sale_count, 1);
        assert_eq!(summary.delivery_fees_cents, 1000);

        assert_eq!(low_stock(&fx.app, token).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_requires_tenant() {
        let fx = fixture().await;
        let err = dashboard(&fx.app, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingTenant);
    }
}
