//! # Stats Repository
//!
//! Dashboard and end-of-day figures. Nothing here is cached; every call
//! recomputes from committed sales and products.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::catalog::fetch_products;
use crate::repository::sale::fetch_recent;
use tally_core::{DailySummary, DashboardStats, Product, TenantId};

#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    /// Revenue for `day` (UTC), low-stock count and the latest sales.
    pub async fn dashboard(
        &self,
        tenant: &TenantId,
        day: NaiveDate,
        recent_limit: u32,
    ) -> DbResult<DashboardStats> {
        debug!(tenant_id = %tenant, %day, "Computing dashboard");

        let mut conn = self.pool.acquire().await?;

        let daily_revenue_cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount_cents), 0)
            FROM sales
            WHERE tenant_id = ?1 AND date(created_at) = ?2
            "#,
        )
        .bind(tenant.as_str())
        .bind(day_key(day))
        .fetch_one(&mut *conn)
        .await?;

        let low_stock_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE tenant_id = ?1 AND stock_milli <= min_stock_milli
            "#,
        )
        .bind(tenant.as_str())
        .fetch_one(&mut *conn)
        .await?;

        let recent_sales = fetch_recent(&mut conn, tenant, recent_limit).await?;

        Ok(DashboardStats {
            day,
            daily_revenue_cents,
            low_stock_count,
            recent_sales,
        })
    }

    pub async fn daily_summary(&self, tenant: &TenantId, day: NaiveDate) -> DbResult<DailySummary> {
        debug!(tenant_id = %tenant, %day, "Computing daily summary");

        let (sale_count, revenue_cents, delivery_fees_cents): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(total_amount_cents), 0),
                COALESCE(SUM(delivery_fee_cents), 0)
            FROM sales
            WHERE tenant_id = ?1 AND date(created_at) = ?2
            "#,
        )
        .bind(tenant.as_str())
        .bind(day_key(day))
        .fetch_one(&self.pool)
        .await?;

        Ok(DailySummary {
            day,
            sale_count,
            revenue_cents,
            delivery_fees_cents,
        })
    }

    /// Products at or below their minimum stock, by name.
    pub async fn low_stock_products(&self, tenant: &TenantId) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_products(&mut conn, tenant, true).await
    }
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
