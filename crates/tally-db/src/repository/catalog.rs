//! # Catalog Repository
//!
//! Products, categories and suppliers.
//!
//! ## Stock Is Not Written Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_product ──► stock_milli = opening_stock_milli = initial stock  │
//! │  update_pricing ──► price / promotional price only                      │
//! │                                                                         │
//! │  Every later stock change goes through inventory::record_movement,     │
//! │  which writes the ledger row in the same statement batch.              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use tally_core::tenant::slugify;
use tally_core::validation::{validate_name, validate_price_cents, validate_stock_level};
use tally_core::{
    Category, CoreError, Product, ProductListing, Supplier, TenantId, Unit, ValidationError,
    DEFAULT_MIN_STOCK_UNITS,
};

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.tenant_id, p.name, p.code, p.description,
    p.price_cents, p.promotional_price_cents, p.unit,
    p.stock_milli, p.min_stock_milli, p.opening_stock_milli,
    p.category_id, p.supplier_id, p.is_kit,
    p.created_at, p.updated_at
"#;

// =============================================================================
// Inputs
// =============================================================================

/// Fields accepted when creating a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub promotional_price_cents: Option<i64>,
    pub unit: Unit,
    /// Opening stock in thousandths.
    pub stock_milli: i64,
    /// Defaults to five units when absent.
    pub min_stock_milli: Option<i64>,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub is_kit: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog reads and management.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a product owned by `tenant`. A product of another tenant is
    /// indistinguishable from a missing one.
    pub async fn get_product(&self, tenant: &TenantId, product_id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, tenant, product_id).await
    }

    /// Lists the tenant's products with their category name, by name.
    pub async fn list_products(&self, tenant: &TenantId) -> DbResult<Vec<ProductListing>> {
        debug!(tenant_id = %tenant, "Listing products");

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id AND c.tenant_id = p.tenant_id
            WHERE p.tenant_id = ?1
            ORDER BY p.name
            "#
        );

        let rows = sqlx::query_as::<_, ProductListing>(&sql)
            .bind(tenant.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn count_products(&self, tenant: &TenantId) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1")
            .bind(tenant.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Creates a product. Its current stock becomes its opening stock.
    pub async fn create_product(&self, tenant: &TenantId, input: NewProduct) -> DbResult<Product> {
        validate_name("name", &input.name)?;
        validate_price_cents("price", input.price_cents)?;
        if let Some(promo) = input.promotional_price_cents {
            validate_price_cents("promotional price", promo)?;
        }
        validate_stock_level("stock", input.stock_milli)?;
        let min_stock_milli = input
            .min_stock_milli
            .unwrap_or(DEFAULT_MIN_STOCK_UNITS * 1000);
        validate_stock_level("minimum stock", min_stock_milli)?;

        let mut conn = self.pool.acquire().await?;

        if let Some(category_id) = input.category_id.as_deref() {
            if !owns(&mut conn, "categories", tenant, category_id).await? {
                return Err(DbError::not_found("Category", category_id));
            }
        }
        if let Some(supplier_id) = input.supplier_id.as_deref() {
            if !owns(&mut conn, "suppliers", tenant, supplier_id).await? {
                return Err(DbError::not_found("Supplier", supplier_id));
            }
        }

        let now = Utc::now();
        let product = Product {
            id: new_id(),
            tenant_id: tenant.to_string(),
            name: input.name.trim().to_string(),
            code: input.code,
            description: input.description,
            price_cents: input.price_cents,
            promotional_price_cents: input.promotional_price_cents,
            unit: input.unit,
            stock_milli: input.stock_milli,
            min_stock_milli,
            opening_stock_milli: input.stock_milli,
            category_id: input.category_id,
            supplier_id: input.supplier_id,
            is_kit: input.is_kit,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, name, code, description,
                price_cents, promotional_price_cents, unit,
                stock_milli, min_stock_milli, opening_stock_milli,
                category_id, supplier_id, is_kit,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11,
                ?12, ?13, ?14,
                ?15, ?16
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.name)
        .bind(&product.code)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.promotional_price_cents)
        .bind(product.unit)
        .bind(product.stock_milli)
        .bind(product.min_stock_milli)
        .bind(product.opening_stock_milli)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.is_kit)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *conn)
        .await?;

        debug!(tenant_id = %tenant, product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Changes regular and promotional price. Past sales keep their
    /// snapshotted prices; stock is untouched.
    pub async fn update_pricing(
        &self,
        tenant: &TenantId,
        product_id: &str,
        price_cents: i64,
        promotional_price_cents: Option<i64>,
    ) -> DbResult<Product> {
        validate_price_cents("price", price_cents)?;
        if let Some(promo) = promotional_price_cents {
            validate_price_cents("promotional price", promo)?;
        }

        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                price_cents = ?3,
                promotional_price_cents = ?4,
                updated_at = ?5
            WHERE id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(tenant.as_str())
        .bind(price_cents)
        .bind(promotional_price_cents)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        debug!(tenant_id = %tenant, product_id = %product_id, price_cents, "Pricing updated");

        fetch_product(&mut conn, tenant, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn list_categories(&self, tenant: &TenantId) -> DbResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, tenant_id, name, slug, created_at
            FROM categories
            WHERE tenant_id = ?1
            ORDER BY name
            "#,
        )
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_category(&self, tenant: &TenantId, name: &str) -> DbResult<Category> {
        validate_name("name", name)?;
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(ValidationError::InvalidFormat {
                field: "name".to_string(),
                reason: "must contain ASCII letters or digits".to_string(),
            }
            .into());
        }

        let category = Category {
            id: new_id(),
            tenant_id: tenant.to_string(),
            name: name.trim().to_string(),
            slug,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO categories (id, tenant_id, name, slug, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.tenant_id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    pub async fn list_suppliers(&self, tenant: &TenantId) -> DbResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, tenant_id, name, document, email, phone, address, notes, created_at
            FROM suppliers
            WHERE tenant_id = ?1
            ORDER BY name
            "#,
        )
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_supplier(&self, tenant: &TenantId, input: NewSupplier) -> DbResult<Supplier> {
        validate_name("name", &input.name)?;

        let supplier = Supplier {
            id: new_id(),
            tenant_id: tenant.to_string(),
            name: input.name.trim().to_string(),
            document: input.document,
            email: input.email,
            phone: input.phone,
            address: input.address,
            notes: input.notes,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, tenant_id, name, document, email, phone, address, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.tenant_id)
        .bind(&supplier.name)
        .bind(&supplier.document)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.notes)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }
}

// =============================================================================
// Connection-level helpers (usable inside a UnitOfWork)
// =============================================================================

/// Reads a product only if it belongs to `tenant`.
pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    tenant: &TenantId,
    product_id: &str,
) -> DbResult<Option<Product>> {
    let sql = format!(
        r#"
        SELECT {PRODUCT_COLUMNS}
        FROM products p
        WHERE p.id = ?1 AND p.tenant_id = ?2
        "#
    );

    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(product_id)
        .bind(tenant.as_str())
        .fetch_optional(conn)
        .await?;

    Ok(row)
}

/// Lists every product of the tenant (storefront and low-stock listings).
pub(crate) async fn fetch_products(
    conn: &mut SqliteConnection,
    tenant: &TenantId,
    low_stock_only: bool,
) -> DbResult<Vec<Product>> {
    let filter = if low_stock_only {
        "AND p.stock_milli <= p.min_stock_milli"
    } else {
        ""
    };
    let sql = format!(
        r#"
        SELECT {PRODUCT_COLUMNS}
        FROM products p
        WHERE p.tenant_id = ?1 {filter}
        ORDER BY p.name
        "#
    );

    let rows = sqlx::query_as::<_, Product>(&sql)
        .bind(tenant.as_str())
        .fetch_all(conn)
        .await?;

    Ok(rows)
}

/// Whether `table` has a row `id` owned by `tenant`. `table` is always a
/// literal from this crate.
async fn owns(
    conn: &mut SqliteConnection,
    table: &'static str,
    tenant: &TenantId,
    id: &str,
) -> DbResult<bool> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE id = ?1 AND tenant_id = ?2");
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(id)
        .bind(tenant.as_str())
        .fetch_one(conn)
        .await?;

    Ok(count > 0)
}
