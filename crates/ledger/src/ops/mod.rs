use std::{future::Future, pin::Pin, time::Duration};

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::ResultLedger;

pub mod accessor;
mod accounts;
mod history;
mod transfer;
mod users;
pub mod writer;

/// Future returned by the body of [`Ledger::with_tx`].
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = ResultLedger<T>> + Send + 'c>>;

/// Handle on the ledger storage.
///
/// Built from an explicitly opened [`DatabaseConnection`]; the connection pool
/// is released by [`Ledger::close`] (or when the last clone of the connection
/// is dropped). Share it between tasks behind an `Arc`.
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
    transfer_timeout: Option<Duration>,
    explicit_row_locks: bool,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// The underlying connection, for callers that need their own queries.
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Run `body` as one atomic unit: commit if it returns `Ok`, roll back
    /// everything it wrote if it returns `Err`.
    ///
    /// Dropping the returned future before it completes also rolls back, since
    /// an uncommitted `DatabaseTransaction` is rolled back on drop.
    pub async fn with_tx<T, F>(&self, body: F) -> ResultLedger<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c Ledger, &'c DatabaseTransaction) -> TxFuture<'c, T> + Send,
    {
        let db_tx = self.database.begin().await?;
        match body(self, &db_tx).await {
            Ok(value) => {
                db_tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, "rolling back transaction");
                if let Err(rollback_err) = db_tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Close the connection pool.
    pub async fn close(self) -> ResultLedger<()> {
        self.database.close().await?;
        Ok(())
    }
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
    transfer_timeout: Option<Duration>,
    explicit_row_locks: bool,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Default deadline applied by [`Ledger::transfer`].
    pub fn transfer_timeout(mut self, timeout: Option<Duration>) -> LedgerBuilder {
        self.transfer_timeout = timeout;
        self
    }

    /// Take an explicit row lock (`SELECT ... FOR UPDATE` where the backend
    /// supports it) on each account before changing its balance.
    pub fn explicit_row_locks(mut self, enabled: bool) -> LedgerBuilder {
        self.explicit_row_locks = enabled;
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
            transfer_timeout: self.transfer_timeout,
            explicit_row_locks: self.explicit_row_locks,
        })
    }
}
