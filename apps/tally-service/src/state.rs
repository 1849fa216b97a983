//! # Application State
//!
//! [`App`] bundles the database handle and the configuration every command
//! receives. The `Database` inside holds a `SqlitePool`, so commands can run
//! concurrently against one `App` without extra locking.

use tally_db::{Database, DbConfig, DbResult, SaleRepository};
use tracing::info;

use crate::config::ServiceConfig;
use crate::context::TenantResolver;

#[derive(Debug, Clone)]
pub struct App {
    db: Database,
    config: ServiceConfig,
}

impl App {
    /// Wraps an existing database (tests, embedding hosts).
    pub fn new(db: Database, config: ServiceConfig) -> Self {
        App { db, config }
    }

    /// Opens the configured database, applying migrations.
    pub async fn connect(config: ServiceConfig) -> DbResult<Self> {
        let db_config =
            DbConfig::new(config.database_path.clone()).max_connections(config.max_connections);
        let db = Database::new(db_config).await?;

        info!(
            path = %config.database_path.display(),
            stock_policy = %config.stock_policy,
            "Tally service ready"
        );

        Ok(App::new(db, config))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn resolver(&self) -> TenantResolver {
        TenantResolver::new(&self.db)
    }

    /// The sale engine under the configured stock policy.
    pub fn sales(&self) -> SaleRepository {
        self.db.sales().with_stock_policy(self.config.stock_policy)
    }
}
