//! # tally-db: Database Layer for Tally
//!
//! SQLite persistence for every tenant, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Data Flow                                │
//! │                                                                         │
//! │  tally-service command (create_sale)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ Tenant        │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Catalog       │    │ 001_initial_ │  │   │
//! │  │   │ UnitOfWork    │    │ Sale engine   │    │   schema.sql │  │   │
//! │  │   │               │    │ Inventory     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          SQLite database shared by all tenants (WAL)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`unit_of_work`] - Transaction boundary
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./tally.db")).await?;
//!
//! let registration = db.tenants().register("Casa de Carnes", "Ana Souza").await?;
//! let receipt = db.sales().record_sale(&tenant, &registration.admin.id, &basket).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use unit_of_work::UnitOfWork;

// Repository re-exports for convenience
pub use repository::catalog::{CatalogRepository, NewProduct, NewSupplier};
pub use repository::customer::{CustomerInput, CustomerRepository};
pub use repository::inventory::{InventoryRepository, StockMovement};
pub use repository::sale::SaleRepository;
pub use repository::stats::StatsRepository;
pub use repository::tenant::{Registration, SettingsInput, TenantRepository};
