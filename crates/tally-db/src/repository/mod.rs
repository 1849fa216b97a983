//! # Repository Module
//!
//! Database repository implementations for Tally.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Command (tally-service)                                               │
//! │       │                                                                 │
//! │       │  db.sales().record_sale(&tenant, &actor, &basket)              │
//! │       ▼                                                                 │
//! │  Repository (pool handle)                                              │
//! │  ├── pool-level methods: one query, or one UnitOfWork                  │
//! │  └── fetch_* / record_*(conn, ..): run inside a caller's transaction   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (every statement filters on tenant_id)                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TenantRepository`](tenant::TenantRepository) - Tenants, users, signup
//! - [`CatalogRepository`](catalog::CatalogRepository) - Products, categories, suppliers
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers and spend
//! - [`SaleRepository`](sale::SaleRepository) - Sale transaction engine
//! - [`InventoryRepository`](inventory::InventoryRepository) - Stock ledger
//! - [`StatsRepository`](stats::StatsRepository) - Dashboard rollups

pub mod catalog;
pub mod customer;
pub mod inventory;
pub mod sale;
pub mod stats;
pub mod tenant;

/// Generates a new primary key.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for repository tests.

    use tally_core::{
        Basket, BasketLimits, BasketLine, DeliveryMode, Money, PaymentMethod, Product, Quantity,
        TenantId, Unit, User,
    };

    use super::catalog::NewProduct;
    use crate::{Database, DbConfig};

    pub struct Shop {
        pub db: Database,
        pub tenant: TenantId,
        pub admin: User,
    }

    pub async fn shop() -> Shop {
        shop_at(DbConfig::in_memory()).await
    }

    /// Same tenant as [`shop`], stored wherever `config` points.
    pub async fn shop_at(config: DbConfig) -> Shop {
        let db = Database::new(config).await.unwrap();
        let registration = db
            .tenants()
            .register("Casa de Carnes", "Ana Souza")
            .await
            .unwrap();
        let tenant = TenantId::from_token(Some(&registration.tenant.id)).unwrap();
        Shop {
            db,
            tenant,
            admin: registration.admin,
        }
    }

    pub async fn second_shop(db: &Database) -> (TenantId, User) {
        let registration = db
            .tenants()
            .register("Outro Açougue", "Bruno Lima")
            .await
            .unwrap();
        let tenant = TenantId::from_token(Some(&registration.tenant.id)).unwrap();
        (tenant, registration.admin)
    }

    pub async fn product(
        shop: &Shop,
        name: &str,
        price_cents: i64,
        promo_cents: Option<i64>,
        stock_units: i64,
    ) -> Product {
        shop.db
            .catalog()
            .create_product(
                &shop.tenant,
                NewProduct {
                    name: name.to_string(),
                    price_cents,
                    promotional_price_cents: promo_cents,
                    unit: Unit::Kg,
                    stock_milli: stock_units * 1000,
                    ..NewProduct::default()
                },
            )
            .await
            .unwrap()
    }

    pub fn line(product: &Product, units: i64) -> BasketLine {
        BasketLine {
            product_id: product.id.clone(),
            quantity: Quantity::from_units(units),
        }
    }

    pub fn pickup(lines: Vec<BasketLine>) -> Basket {
        Basket::new(
            lines,
            PaymentMethod::Cash,
            DeliveryMode::Pickup,
            Money::zero(),
            None,
            BasketLimits::default(),
        )
        .unwrap()
    }
}
