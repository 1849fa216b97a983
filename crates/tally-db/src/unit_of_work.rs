//! # Unit of Work
//!
//! One SQLite write transaction with an explicit commit.
//!
//! ```text
//! let mut uow = db.begin().await?;
//!      │
//!      ├── repo::fetch_*(uow.conn(), ..)      reads see one snapshot
//!      ├── inventory::record_movement(uow.conn(), ..)
//!      │
//!      ├── Ok  ──► uow.commit().await?        all writes land together
//!      └── Err ──► `?` returns, uow dropped   sqlx rolls back on drop
//! ```
//!
//! Units open with `BEGIN IMMEDIATE`, so the write lock is taken up front
//! and concurrent units queue on the busy timeout. A deferred `BEGIN` would
//! read first and then fail the lock upgrade with `database is locked`.
//!
//! Nothing commits implicitly. Any early return, including a panic unwinding
//! through the caller, leaves the store as it was before `begin`.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Scoped transaction handle.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Transaction started");
        Ok(Self { tx })
    }

    /// Connection bound to this transaction.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Rolls back explicitly. Dropping has the same effect.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Transaction rolled back");
        Ok(())
    }
}
