//! # Sale Repository
//!
//! The sale transaction engine: turns a validated [`Basket`] into an
//! immutable sale, its items, and one ledger entry per item, atomically.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       record_sale()                                     │
//! │                                                                         │
//! │  BEGIN (UnitOfWork)                                                     │
//! │   │                                                                     │
//! │   ├── actor in tenant?           no ──► ActorNotFound      ┐            │
//! │   ├── customer in tenant?        no ──► CustomerNotFound   │ nothing    │
//! │   ├── every product in tenant?   no ──► ProductNotFound    │ written,   │
//! │   ├── StockPolicy::check         no ──► InsufficientStock  │ rollback   │
//! │   ├── Basket::price (snapshot prices, totals)              ┘ on drop    │
//! │   │                                                                     │
//! │   ├── next receipt number  YYYYMMDD-NNNN                                │
//! │   ├── INSERT sales                                                      │
//! │   └── per line:                                                         │
//! │        ├── INSERT sale_items (name, unit price frozen)                  │
//! │        └── record_movement(-quantity, "sale", "Sale #<receipt>")        │
//! │   │                                                                     │
//! │  COMMIT ──► SaleReceipt                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::catalog::fetch_product;
use crate::repository::customer::fetch_customer;
use crate::repository::inventory::{record_movement, StockMovement};
use crate::repository::new_id;
use crate::repository::tenant::fetch_user;
use crate::unit_of_work::UnitOfWork;
use tally_core::{
    Basket, CoreError, MovementType, Sale, SaleItem, SaleReceipt, StockPolicy, TenantId,
};

pub(crate) const SALE_COLUMNS: &str = r#"
    id, tenant_id, receipt_number, customer_id, user_id,
    subtotal_cents, delivery_fee_cents, total_amount_cents,
    payment_method, delivery_mode, created_at
"#;

/// Repository for sale operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    stock_policy: StockPolicy,
}

impl SaleRepository {
    /// Creates a SaleRepository with the default stock policy.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository {
            pool,
            stock_policy: StockPolicy::default(),
        }
    }

    pub fn with_stock_policy(mut self, stock_policy: StockPolicy) -> Self {
        self.stock_policy = stock_policy;
        self
    }

    /// Records a sale and its stock movements in one transaction.
    ///
    /// ## Arguments
    /// * `tenant` - Active tenant; every row read or written is scoped to it
    /// * `actor_id` - User performing the sale, attributed in the ledger
    /// * `basket` - Already validated basket
    ///
    /// ## Errors
    /// Any error leaves sales, sale items, stock and ledger untouched.
    pub async fn record_sale(
        &self,
        tenant: &TenantId,
        actor_id: &str,
        basket: &Basket,
    ) -> DbResult<SaleReceipt> {
        debug!(
            tenant_id = %tenant,
            lines = basket.lines().len(),
            policy = %self.stock_policy,
            "Recording sale"
        );

        let mut uow = UnitOfWork::begin(&self.pool).await?;

        if fetch_user(uow.conn(), tenant, actor_id).await?.is_none() {
            return Err(CoreError::ActorNotFound(actor_id.to_string()).into());
        }

        if let Some(customer_id) = basket.customer_id() {
            if fetch_customer(uow.conn(), tenant, customer_id).await?.is_none() {
                return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
            }
        }

        let mut products = Vec::new();
        for product_id in basket.product_ids() {
            let product = fetch_product(uow.conn(), tenant, product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
            products.push(product);
        }

        self.stock_policy.check(basket, &products)?;
        let priced = basket.price(&products)?;

        let now = Utc::now();
        let receipt_number = next_receipt_number(uow.conn(), tenant, now.date_naive()).await?;

        let sale = Sale {
            id: new_id(),
            tenant_id: tenant.to_string(),
            receipt_number,
            customer_id: basket.customer_id().map(str::to_string),
            user_id: actor_id.to_string(),
            subtotal_cents: priced.subtotal.cents(),
            delivery_fee_cents: priced.delivery_fee.cents(),
            total_amount_cents: priced.total.cents(),
            payment_method: basket.payment_method(),
            delivery_mode: basket.delivery_mode(),
            created_at: now,
        };

        insert_sale(uow.conn(), &sale).await?;

        let reason = format!("Sale #{}", sale.receipt_number);
        let mut items = Vec::with_capacity(priced.lines.len());

        for line in &priced.lines {
            let item = SaleItem {
                id: new_id(),
                tenant_id: sale.tenant_id.clone(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                name_snapshot: line.name.clone(),
                quantity_milli: line.quantity.milli(),
                unit_price_cents: line.unit_price.cents(),
                subtotal_cents: line.subtotal.cents(),
            };
            insert_item(uow.conn(), &item).await?;

            record_movement(
                uow.conn(),
                &StockMovement {
                    tenant,
                    product_id: &item.product_id,
                    user_id: actor_id,
                    change: -line.quantity,
                    movement_type: MovementType::Sale,
                    reason: &reason,
                    sale_id: Some(&sale.id),
                    at: now,
                },
            )
            .await?;

            items.push(item);
        }

        uow.commit().await?;

        info!(
            tenant_id = %tenant,
            sale_id = %sale.id,
            receipt_number = %sale.receipt_number,
            total_cents = sale.total_amount_cents,
            items = items.len(),
            "Sale committed"
        );

        Ok(SaleReceipt {
            sale_id: sale.id,
            receipt_number: sale.receipt_number,
            subtotal_cents: sale.subtotal_cents,
            delivery_fee_cents: sale.delivery_fee_cents,
            total_amount_cents: sale.total_amount_cents,
            payment_method: sale.payment_method,
            delivery_mode: sale.delivery_mode,
            items,
            created_at: sale.created_at,
        })
    }

    pub async fn get(&self, tenant: &TenantId, sale_id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1 AND tenant_id = ?2");

        let row = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_id)
            .bind(tenant.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Items of a sale in insertion order.
    pub async fn items(&self, tenant: &TenantId, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let rows = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                id, tenant_id, sale_id, product_id, name_snapshot,
                quantity_milli, unit_price_cents, subtotal_cents
            FROM sale_items
            WHERE sale_id = ?1 AND tenant_id = ?2
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Most recent sales, newest first.
    pub async fn list_recent(&self, tenant: &TenantId, limit: u32) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch_recent(&mut conn, tenant, limit).await
    }
}

pub(crate) async fn fetch_recent(
    conn: &mut SqliteConnection,
    tenant: &TenantId,
    limit: u32,
) -> DbResult<Vec<Sale>> {
    let sql = format!(
        r#"
        SELECT {SALE_COLUMNS}
        FROM sales
        WHERE tenant_id = ?1
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?2
        "#
    );

    let rows = sqlx::query_as::<_, Sale>(&sql)
        .bind(tenant.as_str())
        .bind(limit)
        .fetch_all(conn)
        .await?;

    Ok(rows)
}

/// Next per-tenant daily receipt number, `YYYYMMDD-NNNN`.
///
/// Counted inside the sale transaction, which already holds the write lock,
/// so concurrent sales count one after another. `UNIQUE (tenant_id,
/// receipt_number)` still backs the sequence.
async fn next_receipt_number(
    conn: &mut SqliteConnection,
    tenant: &TenantId,
    day: NaiveDate,
) -> DbResult<String> {
    let prefix = day.format("%Y%m%d").to_string();

    let issued: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sales WHERE tenant_id = ?1 AND receipt_number LIKE ?2",
    )
    .bind(tenant.as_str())
    .bind(format!("{prefix}-%"))
    .fetch_one(conn)
    .await?;

    Ok(format!("{}-{:04}", prefix, issued + 1))
}

async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, tenant_id, receipt_number, customer_id, user_id,
            subtotal_cents, delivery_fee_cents, total_amount_cents,
            payment_method, delivery_mode, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.tenant_id)
    .bind(&sale.receipt_number)
    .bind(&sale.customer_id)
    .bind(&sale.user_id)
    .bind(sale.subtotal_cents)
    .bind(sale.delivery_fee_cents)
    .bind(sale.total_amount_cents)
    .bind(sale.payment_method)
    .bind(sale.delivery_mode)
    .bind(sale.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, tenant_id, sale_id, product_id, name_snapshot,
            quantity_milli, unit_price_cents, subtotal_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.tenant_id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.name_snapshot)
    .bind(item.quantity_milli)
    .bind(item.unit_price_cents)
    .bind(item.subtotal_cents)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
