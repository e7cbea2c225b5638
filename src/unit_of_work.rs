use async_trait::async_trait;

use crate::error::Result;
use crate::ports::{CartItemPort, CartPort, OrderItemPort, OrderPort, ProductPort, UserPort};

/// Unit of Work pattern for managing storage transactions.
///
/// The UnitOfWork is the single injection point for a storage backend:
/// services hold one and open a session per operation.
#[async_trait]
pub trait UnitOfWork: Send + Sync + 'static {
    type Session: UnitOfWorkSession;

    /// Begin a new transaction session.
    async fn begin(&self) -> Result<Self::Session>;
}

/// Represents a single transaction session.
///
/// Every port handed out by a session writes through the same
/// transaction. A session dropped without `commit` discards its writes.
#[async_trait]
pub trait UnitOfWorkSession: Send + Sync {
    fn users(&self) -> &dyn UserPort;

    fn products(&self) -> &dyn ProductPort;

    fn carts(&self) -> &dyn CartPort;

    fn cart_items(&self) -> &dyn CartItemPort;

    fn orders(&self) -> &dyn OrderPort;

    fn order_items(&self) -> &dyn OrderItemPort;

    /// Commit the transaction.
    async fn commit(self) -> Result<()>;

    /// Rollback the transaction.
    async fn rollback(self) -> Result<()>;
}

/// Commits the session when `outcome` is `Ok`, rolls it back otherwise.
///
/// A failed rollback is logged and the original error is returned.
pub async fn finish<S, T>(session: S, outcome: Result<T>) -> Result<T>
where
    S: UnitOfWorkSession,
{
    match outcome {
        Ok(value) => {
            session.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = session.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
