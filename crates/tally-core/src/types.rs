//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Tenant      │   │     Product     │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  tenant_id      │   │  receipt_number │       │
//! │  │  slug (unique)  │   │  price_cents    │   │  total_amount   │       │
//! │  │  name           │   │  promo_cents    │   │  payment_method │       │
//! │  └─────────────────┘   │  stock_milli    │   │  delivery_mode  │       │
//! │                        └────────┬────────┘   └────────┬────────┘       │
//! │                                 │                     │                 │
//! │                        ┌────────▼────────┐   ┌────────▼────────┐       │
//! │                        │ InventoryLog    │   │    SaleItem     │       │
//! │                        │  (append-only)  │   │   (snapshot)    │       │
//! │                        │  change_milli   │   │  unit_price     │       │
//! │                        │  movement_type  │   │  quantity_milli │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Scoping
//! Every entity except [`Tenant`] carries `tenant_id`. Repositories filter on
//! it in every query; nothing in this module crosses tenants.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Enumerations
// =============================================================================

/// How a product is measured and sold.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Sold by weight; quantities are grams.
    Kg,
    /// Sold by piece.
    Un,
}

impl Default for Unit {
    fn default() -> Self {
        Unit::Un
    }
}

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Instant bank transfer, confirmed manually by the cashier.
    Pix,
}

/// Whether the customer takes the goods or they are delivered.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Pickup,
    Delivery,
}

impl Default for DeliveryMode {
    fn default() -> Self {
        DeliveryMode::Pickup
    }
}

/// Kind of stock movement recorded in the inventory ledger.
///
/// ## Sign Rules
/// ```text
/// Sale        change < 0   (engine only)
/// Entry       change > 0   (goods received)
/// Exit        change < 0   (loss, waste, internal use)
/// Adjustment  change ≠ 0   (stock count correction)
/// ```
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Sale,
    Entry,
    Exit,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Sale => "sale",
            MovementType::Entry => "entry",
            MovementType::Exit => "exit",
            MovementType::Adjustment => "adjustment",
        }
    }
}

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Cashier,
    StockManager,
}

// =============================================================================
// Tenant & User
// =============================================================================

/// A business sharing the storage instance.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    /// URL-safe identifier used by the public storefront.
    pub slug: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Storefront contact details of a tenant.
///
/// A tenant that never saved settings reads as [`TenantSettings::empty`],
/// with `updated_at` unset.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenantSettings {
    pub tenant_id: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub opening_hours: Option<String>,
    pub logo_url: Option<String>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TenantSettings {
    pub fn empty(tenant_id: impl Into<String>) -> Self {
        TenantSettings {
            tenant_id: tenant_id.into(),
            address: None,
            phone: None,
            whatsapp: None,
            instagram: None,
            facebook: None,
            opening_hours: None,
            logo_url: None,
            updated_at: None,
        }
    }
}

/// A person acting on behalf of a tenant. Identity only, no credentials.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub tenant_id: String,
    pub username: String,
    pub name: String,
    pub role: UserRole,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Catalog
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub slug: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Tax registration number.
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A product available for sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Optional shop code (barcode, PLU).
    pub code: Option<String>,

    pub description: Option<String>,

    /// Regular price in cents, per unit or per kg.
    pub price_cents: i64,

    /// Promotional price in cents. Overrides the regular price when set.
    pub promotional_price_cents: Option<i64>,

    pub unit: Unit,

    /// Current stock in thousandths. May be negative under `AllowNegative`.
    pub stock_milli: i64,

    /// Low-stock threshold in thousandths.
    pub min_stock_milli: i64,

    /// Stock at creation. Ledger changes are summed on top of this.
    pub opening_stock_milli: i64,

    pub category_id: Option<String>,

    pub supplier_id: Option<String>,

    /// Bundle of other products sold as a single line.
    pub is_kit: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn promotional_price(&self) -> Option<Money> {
        self.promotional_price_cents.map(Money::from_cents)
    }

    /// The price a sale charges right now: promotional if set, else regular.
    ///
    /// ## Example
    /// ```text
    /// Costela Gaúcha: price 39.90, promo 34.90 → 34.90
    /// Picanha:        price 89.90, promo none  → 89.90
    /// ```
    #[inline]
    pub fn effective_price(&self) -> Money {
        self.promotional_price().unwrap_or_else(|| self.price())
    }

    #[inline]
    pub fn stock(&self) -> Quantity {
        Quantity::from_milli(self.stock_milli)
    }

    #[inline]
    pub fn min_stock(&self) -> Quantity {
        Quantity::from_milli(self.min_stock_milli)
    }

    /// Matches the dashboard's low-stock rule: `stock <= min_stock`.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_milli <= self.min_stock_milli
    }
}

/// Product row joined with its category name for catalog listings.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
}

// =============================================================================
// Customers
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Customer with lifetime spend, as listed in the back office.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub customer: Customer,
    pub total_spent_cents: i64,
    #[ts(as = "Option<String>")]
    pub last_visit: Option<DateTime<Utc>>,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Immutable once written.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub tenant_id: String,
    /// Per-tenant daily sequence, `YYYYMMDD-NNNN`.
    pub receipt_number: String,
    pub customer_id: Option<String>,
    pub user_id: String,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub delivery_mode: DeliveryMode,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub tenant_id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity_milli: i64,
    /// Effective unit price at time of sale (frozen).
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// What the engine hands back after a committed sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub sale_id: String,
    pub receipt_number: String,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub delivery_mode: DeliveryMode,
    pub items: Vec<SaleItem>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Inventory Ledger
// =============================================================================

/// One append-only stock movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLogEntry {
    pub id: String,
    pub tenant_id: String,
    pub product_id: String,
    /// Actor that caused the movement.
    pub user_id: String,
    /// Signed change in thousandths.
    pub quantity_change_milli: i64,
    pub movement_type: MovementType,
    pub reason: String,
    /// Set for `sale` movements.
    pub sale_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Ledger entry joined with display names for the history screen.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryHistoryEntry {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub entry: InventoryLogEntry,
    pub product_name: String,
    pub user_name: String,
}

/// Bookkeeping check for one product:
/// `stock == opening_stock + Σ quantity_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerBalance {
    pub opening_stock_milli: i64,
    pub ledger_sum_milli: i64,
    pub stock_milli: i64,
}

impl LedgerBalance {
    #[inline]
    pub fn expected_stock_milli(&self) -> i64 {
        self.opening_stock_milli + self.ledger_sum_milli
    }

    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.stock_milli == self.expected_stock_milli()
    }
}

// =============================================================================
// Reporting
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub daily_revenue_cents: i64,
    pub low_stock_count: i64,
    pub recent_sales: Vec<Sale>,
}

/// End-of-day figures for the fiscal report.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub sale_count: i64,
    pub revenue_cents: i64,
    pub delivery_fees_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, promo: Option<i64>) -> Product {
        let now = Utc::now();
        Product {
            id: "p1".to_string(),
            tenant_id: "t1".to_string(),
            name: "Costela Gaúcha".to_string(),
            code: None,
            description: None,
            price_cents: price,
            promotional_price_cents: promo,
            unit: Unit::Kg,
            stock_milli: 5_000,
            min_stock_milli: 5_000,
            opening_stock_milli: 5_000,
            category_id: None,
            supplier_id: None,
            is_kit: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_effective_price_prefers_promotion() {
        assert_eq!(product(3990, Some(3490)).effective_price().cents(), 3490);
        assert_eq!(product(8990, None).effective_price().cents(), 8990);
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        let mut p = product(100, None);
        assert!(p.is_low_stock());
        p.stock_milli = 5_001;
        assert!(!p.is_low_stock());
    }

    #[test]
    fn test_ledger_balance() {
        let balance = LedgerBalance {
            opening_stock_milli: 50_000,
            ledger_sum_milli: -2_000,
            stock_milli: 48_000,
        };
        assert!(balance.is_balanced());

        let drifted = LedgerBalance {
            stock_milli: 47_000,
            ..balance
        };
        assert!(!drifted.is_balanced());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Pix).unwrap(), "\"pix\"");
        assert_eq!(
            serde_json::to_string(&UserRole::StockManager).unwrap(),
            "\"stock_manager\""
        );
        assert_eq!(MovementType::Adjustment.as_str(), "adjustment");
        assert_eq!(DeliveryMode::default(), DeliveryMode::Pickup);
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let json = serde_json::to_value(product(3990, Some(3490))).unwrap();
        assert_eq!(json["promotionalPriceCents"], 3490);
        assert_eq!(json["unit"], "kg");
    }
}
