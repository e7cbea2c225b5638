use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};

use crate::error::{Error, Result};

/// Exclusive access to the open transaction for one statement.
pub(crate) type Statement =
    OwnedMappedMutexGuard<Option<Transaction<'static, Postgres>>, Transaction<'static, Postgres>>;

/// Executor wraps a database transaction for use by the adapters.
///
/// This struct provides a shared reference to a PostgreSQL transaction
/// that is handed to every adapter of one session.
#[derive(Clone, Debug)]
pub struct Executor {
    tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    /// Creates a new Executor from a PostgreSQL transaction.
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Locks the transaction for one statement.
    pub(crate) async fn acquire(&self) -> Result<Statement> {
        let guard = Arc::clone(&self.tx).lock_owned().await;
        OwnedMutexGuard::try_map(guard, Option::as_mut)
            .map_err(|_| Error::Transaction("transaction already finished".to_string()))
    }

    /// Takes ownership of the transaction, leaving None in its place.
    /// This should only be called when committing or rolling back.
    pub(crate) async fn take_transaction(&self) -> Result<Transaction<'static, Postgres>> {
        self.tx
            .lock()
            .await
            .take()
            .ok_or_else(|| Error::Transaction("transaction already finished".to_string()))
    }
}
