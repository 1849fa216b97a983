//! # Catalog Commands
//!
//! Product, category and supplier management for the back-office UI.
//! Stock is only set here at creation; later changes go through
//! `inventory::adjust_stock` or a sale.

use serde::Deserialize;
use tracing::debug;
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::state::App;
use tally_core::{Category, Product, ProductListing, Quantity, Supplier, Unit};
use tally_db::{NewProduct, NewSupplier};

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub promotional_price_cents: Option<i64>,
    #[serde(default)]
    pub unit: Unit,
    /// Opening stock in decimal units.
    #[serde(default)]
    #[ts(type = "number")]
    pub stock: Quantity,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub min_stock: Option<Quantity>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub is_kit: bool,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(r: CreateProductRequest) -> Self {
        NewProduct {
            name: r.name,
            code: r.code,
            description: r.description,
            price_cents: r.price_cents,
            promotional_price_cents: r.promotional_price_cents,
            unit: r.unit,
            stock_milli: r.stock.milli(),
            min_stock_milli: r.min_stock.map(|q| q.milli()),
            category_id: r.category_id,
            supplier_id: r.supplier_id,
            is_kit: r.is_kit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePricingRequest {
    pub product_id: String,
    pub price_cents: i64,
    /// `null` removes the promotion.
    #[serde(default)]
    pub promotional_price_cents: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSupplierRequest {
    pub name: String,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<CreateSupplierRequest> for NewSupplier {
    fn from(r: CreateSupplierRequest) -> Self {
        NewSupplier {
            name: r.name,
            document: r.document,
            email: r.email,
            phone: r.phone,
            address: r.address,
            notes: r.notes,
        }
    }
}

// =============================================================================
// Products
// =============================================================================

pub async fn list_products(app: &App, token: Option<&str>) -> ApiResult<Vec<ProductListing>> {
    let ctx = app.resolver().resolve(token).await?;
    debug!(tenant_id = %ctx.id, "list_products command");
    Ok(app.db().catalog().list_products(&ctx.id).await?)
}

pub async fn get_product(app: &App, token: Option<&str>, product_id: &str) -> ApiResult<Product> {
    let ctx = app.resolver().resolve(token).await?;
    app.db()
        .catalog()
        .get_product(&ctx.id, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))
}

pub async fn create_product(
    app: &App,
    token: Option<&str>,
    request: CreateProductRequest,
) -> ApiResult<Product> {
    let ctx = app.resolver().resolve(token).await?;
    debug!(tenant_id = %ctx.id, name = %request.name, "create_product command");
    Ok(app.db().catalog().create_product(&ctx.id, request.into()).await?)
}

pub async fn update_pricing(
    app: &App,
    token: Option<&str>,
    request: UpdatePricingRequest,
) -> ApiResult<Product> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app
        .db()
        .catalog()
        .update_pricing(
            &ctx.id,
            &request.product_id,
            request.price_cents,
            request.promotional_price_cents,
        )
        .await?)
}

// =============================================================================
// Categories & Suppliers
// =============================================================================

pub async fn list_categories(app: &App, token: Option<&str>) -> ApiResult<Vec<Category>> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app.db().catalog().list_categories(&ctx.id).await?)
}

pub async fn create_category(
    app: &App,
    token: Option<&str>,
    request: CreateCategoryRequest,
) -> ApiResult<Category> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app.db().catalog().create_category(&ctx.id, &request.name).await?)
}

pub async fn list_suppliers(app: &App, token: Option<&str>) -> ApiResult<Vec<Supplier>> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app.db().catalog().list_suppliers(&ctx.id).await?)
}

pub async fn create_supplier(
    app: &App,
    token: Option<&str>,
    request: CreateSupplierRequest,
) -> ApiResult<Supplier> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app.db().catalog().create_supplier(&ctx.id, request.into()).await?)
}
