//! PostgreSQL adapters.
//!
//! A [`PostgresUnitOfWork`] opens one `sqlx` transaction per session. The
//! transaction lives in an [`Executor`] shared by the six per-entity
//! adapters, so every statement of a session commits or rolls back together.

mod cart;
mod cart_item;
mod executor;
mod order;
mod order_item;
mod product;
mod user;

pub use cart::PgCartAdapter;
pub use cart_item::PgCartItemAdapter;
pub use executor::Executor;
pub use order::PgOrderAdapter;
pub use order_item::PgOrderItemAdapter;
pub use product::PgProductAdapter;
pub use user::PgUserAdapter;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ports::{CartItemPort, CartPort, OrderItemPort, OrderPort, ProductPort, UserPort};
use crate::unit_of_work::{UnitOfWork, UnitOfWorkSession};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| Error::Internal(format!("migration failed: {e}")))
}

/// Default implementation of UnitOfWork for PostgreSQL.
#[derive(Clone)]
pub struct PostgresUnitOfWork {
    pool: Arc<PgPool>,
}

impl PostgresUnitOfWork {
    /// Create a new PostgresUnitOfWork with the given connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    type Session = PostgresUnitOfWorkSession;

    async fn begin(&self) -> Result<Self::Session> {
        let tx = self.pool.begin().await?;
        Ok(PostgresUnitOfWorkSession::new(Executor::new(tx)))
    }
}

/// Default implementation of UnitOfWorkSession for PostgreSQL.
pub struct PostgresUnitOfWorkSession {
    executor: Executor,
    users: PgUserAdapter,
    products: PgProductAdapter,
    carts: PgCartAdapter,
    cart_items: PgCartItemAdapter,
    orders: PgOrderAdapter,
    order_items: PgOrderItemAdapter,
}

impl PostgresUnitOfWorkSession {
    /// Create a new session around an executor.
    pub fn new(executor: Executor) -> Self {
        Self {
            users: PgUserAdapter::new(executor.clone()),
            products: PgProductAdapter::new(executor.clone()),
            carts: PgCartAdapter::new(executor.clone()),
            cart_items: PgCartItemAdapter::new(executor.clone()),
            orders: PgOrderAdapter::new(executor.clone()),
            order_items: PgOrderItemAdapter::new(executor.clone()),
            executor,
        }
    }

    /// Get the executor for this session (provides access to the transaction).
    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}

#[async_trait]
impl UnitOfWorkSession for PostgresUnitOfWorkSession {
    fn users(&self) -> &dyn UserPort {
        &self.users
    }

    fn products(&self) -> &dyn ProductPort {
        &self.products
    }

    fn carts(&self) -> &dyn CartPort {
        &self.carts
    }

    fn cart_items(&self) -> &dyn CartItemPort {
        &self.cart_items
    }

    fn orders(&self) -> &dyn OrderPort {
        &self.orders
    }

    fn order_items(&self) -> &dyn OrderItemPort {
        &self.order_items
    }

    async fn commit(self) -> Result<()> {
        let tx = self.executor.take_transaction().await?;
        tx.commit()
            .await
            .map_err(|e| Error::Transaction(format!("commit failed: {e}")))
    }

    async fn rollback(self) -> Result<()> {
        let tx = self.executor.take_transaction().await?;
        tx.rollback()
            .await
            .map_err(|e| Error::Transaction(format!("rollback failed: {e}")))
    }
}

/// Translates a storage error raised while operating on `entity` `id`.
pub(crate) fn translate(err: sqlx::Error, entity: &'static str, id: impl ToString) -> Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return Error::Conflict(format!("{entity} already exists"));
        }
        if db.is_check_violation() {
            return Error::Validation(format!(
                "{entity} violates {}",
                db.constraint().unwrap_or("a check constraint")
            ));
        }
        if db.is_foreign_key_violation() {
            return Error::Conflict(format!(
                "{entity} {} is still referenced by other records",
                id.to_string()
            ));
        }
    }
    if matches!(err, sqlx::Error::RowNotFound) {
        return Error::not_found(entity, id);
    }
    Error::Database(err)
}

/// Translates an insert error, reporting a missing parent row as `NotFound`.
///
/// `references` pairs foreign-key constraint names with the entity and id
/// they point at.
pub(crate) fn translate_insert(
    err: sqlx::Error,
    entity: &'static str,
    references: &[(&str, &'static str, Uuid)],
) -> Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_foreign_key_violation() {
            let constraint = db.constraint().unwrap_or_default();
            if let Some((_, target, id)) = references.iter().find(|(name, _, _)| *name == constraint) {
                return Error::not_found(target, id);
            }
        }
    }
    translate(err, entity, "new")
}
