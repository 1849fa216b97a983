//! # Inventory Ledger
//!
//! Append-only record of every stock change, kept in lockstep with
//! `products.stock_milli`.
//!
//! ## The Pairing Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   record_movement(conn, movement)      the ONLY writer of stock        │
//! │        │                                                                │
//! │        ├── UPDATE products SET stock_milli = stock_milli + change      │
//! │        └── INSERT INTO inventory_logs (..., change, ...)               │
//! │                                                                         │
//! │   Both statements run on the caller's transaction connection, so a     │
//! │   rollback removes both. Hence, for every product at every commit:     │
//! │                                                                         │
//! │       stock_milli == opening_stock_milli + Σ quantity_change_milli     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Movement Types
//! ```text
//! sale        written by the sale engine only, change = -quantity
//! entry       manual, change > 0
//! exit        manual, change < 0
//! adjustment  manual, change ≠ 0
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::catalog::fetch_product;
use crate::repository::new_id;
use crate::repository::tenant::fetch_user;
use crate::unit_of_work::UnitOfWork;
use tally_core::validation::validate_reason;
use tally_core::{
    CoreError, InventoryHistoryEntry, LedgerBalance, MovementType, Quantity, TenantId,
};

const HISTORY_COLUMNS: &str = r#"
    l.id, l.tenant_id, l.product_id, l.user_id, l.quantity_change_milli,
    l.movement_type, l.reason, l.sale_id, l.created_at,
    p.name AS product_name, u.name AS user_name
"#;

/// One stock change about to be recorded.
#[derive(Debug, Clone)]
pub struct StockMovement<'a> {
    pub tenant: &'a TenantId,
    pub product_id: &'a str,
    pub user_id: &'a str,
    pub change: Quantity,
    pub movement_type: MovementType,
    pub reason: &'a str,
    pub sale_id: Option<&'a str>,
    pub at: DateTime<Utc>,
}

/// Applies a stock change and appends its ledger entry on `conn`.
///
/// Returns the product's new stock in thousandths. A product outside the
/// tenant yields `ProductNotFound` and nothing is written.
pub(crate) async fn record_movement(
    conn: &mut SqliteConnection,
    movement: &StockMovement<'_>,
) -> DbResult<i64> {
    let new_stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products SET
            stock_milli = stock_milli + ?3,
            updated_at = ?4
        WHERE id = ?1 AND tenant_id = ?2
        RETURNING stock_milli
        "#,
    )
    .bind(movement.product_id)
    .bind(movement.tenant.as_str())
    .bind(movement.change.milli())
    .bind(movement.at)
    .fetch_optional(&mut *conn)
    .await?;

    let new_stock =
        new_stock.ok_or_else(|| CoreError::ProductNotFound(movement.product_id.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO inventory_logs (
            id, tenant_id, product_id, user_id,
            quantity_change_milli, movement_type, reason, sale_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(new_id())
    .bind(movement.tenant.as_str())
    .bind(movement.product_id)
    .bind(movement.user_id)
    .bind(movement.change.milli())
    .bind(movement.movement_type)
    .bind(movement.reason)
    .bind(movement.sale_id)
    .bind(movement.at)
    .execute(&mut *conn)
    .await?;

    debug!(
        tenant_id = %movement.tenant,
        product_id = %movement.product_id,
        change = movement.change.milli(),
        movement_type = movement.movement_type.as_str(),
        new_stock,
        "Stock movement recorded"
    );

    Ok(new_stock)
}

/// Checks the sign rules for a manual movement.
fn check_manual_movement(change: Quantity, movement_type: MovementType) -> Result<(), CoreError> {
    let reason = match movement_type {
        MovementType::Sale => Some("sale movements are recorded by the sale engine"),
        MovementType::Entry if !change.is_positive() => Some("entry must increase stock"),
        MovementType::Exit if !change.is_negative() => Some("exit must decrease stock"),
        MovementType::Adjustment if change.is_zero() => Some("adjustment must change stock"),
        _ => None,
    };

    match reason {
        Some(reason) => Err(CoreError::InvalidMovement {
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Repository for manual stock movements and ledger reads.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Records a manual entry, exit or adjustment in its own transaction.
    ///
    /// ## Errors
    /// - `InvalidMovement` for a `sale` type or a change with the wrong sign
    /// - `ProductNotFound` / `ActorNotFound` when either is outside the tenant
    ///
    /// ## Returns
    /// The product's new stock.
    pub async fn manual_adjust(
        &self,
        tenant: &TenantId,
        product_id: &str,
        actor_id: &str,
        change: Quantity,
        movement_type: MovementType,
        reason: &str,
    ) -> DbResult<Quantity> {
        check_manual_movement(change, movement_type)?;
        validate_reason(reason)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;

        if fetch_user(uow.conn(), tenant, actor_id).await?.is_none() {
            return Err(CoreError::ActorNotFound(actor_id.to_string()).into());
        }
        if fetch_product(uow.conn(), tenant, product_id).await?.is_none() {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        let new_stock = record_movement(
            uow.conn(),
            &StockMovement {
                tenant,
                product_id,
                user_id: actor_id,
                change,
                movement_type,
                reason: reason.trim(),
                sale_id: None,
                at: Utc::now(),
            },
        )
        .await?;

        uow.commit().await?;

        info!(
            tenant_id = %tenant,
            product_id = %product_id,
            change = change.milli(),
            movement_type = movement_type.as_str(),
            "Manual stock movement committed"
        );

        Ok(Quantity::from_milli(new_stock))
    }

    /// Most recent movements of the tenant, newest first.
    pub async fn history(&self, tenant: &TenantId, limit: u32) -> DbResult<Vec<InventoryHistoryEntry>> {
        let sql = format!(
            r#"
            SELECT {HISTORY_COLUMNS}
            FROM inventory_logs l
            JOIN products p ON p.id = l.product_id
            JOIN users u ON u.id = l.user_id
            WHERE l.tenant_id = ?1
            ORDER BY l.created_at DESC, l.rowid DESC
            LIMIT ?2
            "#
        );

        let rows = sqlx::query_as::<_, InventoryHistoryEntry>(&sql)
            .bind(tenant.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Movements of a single product, newest first.
    pub async fn product_history(
        &self,
        tenant: &TenantId,
        product_id: &str,
        limit: u32,
    ) -> DbResult<Vec<InventoryHistoryEntry>> {
        let sql = format!(
            r#"
            SELECT {HISTORY_COLUMNS}
            FROM inventory_logs l
            JOIN products p ON p.id = l.product_id
            JOIN users u ON u.id = l.user_id
            WHERE l.tenant_id = ?1 AND l.product_id = ?2
            ORDER BY l.created_at DESC, l.rowid DESC
            LIMIT ?3
            "#
        );

        let rows = sqlx::query_as::<_, InventoryHistoryEntry>(&sql)
            .bind(tenant.as_str())
            .bind(product_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Compares a product's stock with its opening stock plus the ledger.
    pub async fn balance(&self, tenant: &TenantId, product_id: &str) -> DbResult<LedgerBalance> {
        let row: Option<(i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                p.opening_stock_milli,
                COALESCE((
                    SELECT SUM(l.quantity_change_milli)
                    FROM inventory_logs l
                    WHERE l.product_id = p.id AND l.tenant_id = p.tenant_id
                ), 0),
                p.stock_milli
            FROM products p
            WHERE p.id = ?1 AND p.tenant_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let (opening_stock_milli, ledger_sum_milli, stock_milli) =
            row.ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        Ok(LedgerBalance {
            opening_stock_milli,
            ledger_sum_milli,
            stock_milli,
        })
    }
}
