use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{translate, translate_insert, Executor};
use crate::domain::{NewOrder, Order, OrderFilter};
use crate::error::{Error, Result};
use crate::ports::OrderPort;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

/// Order adapter bound to one session's transaction.
pub struct PgOrderAdapter {
    executor: Executor,
}

impl PgOrderAdapter {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl OrderPort for PgOrderAdapter {
    async fn create(&self, order: NewOrder) -> Result<Order> {
        let mut tx = self.executor.acquire().await?;
        let row: OrderRow = sqlx::query_as(
            "INSERT INTO orders (id, user_id) VALUES ($1, $2) RETURNING id, user_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(order.user_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| translate_insert(e, "order", &[("orders_user_fk", "user", order.user_id)]))?;
        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> Result<Order> {
        let mut tx = self.executor.acquire().await?;
        let row: OrderRow = sqlx::query_as("SELECT id, user_id, created_at FROM orders WHERE id = $1")
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| translate(e, "order", id))?;
        Ok(row.into())
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let mut tx = self.executor.acquire().await?;
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, user_id, created_at FROM orders \
             WHERE ($1::UUID IS NULL OR user_id = $1) ORDER BY seq DESC",
        )
        .bind(filter.user_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.executor.acquire().await?;
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("order", id));
        }
        Ok(())
    }
}
