use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{translate, translate_insert, Executor};
use crate::domain::{NewOrderItem, OrderItem};
use crate::error::{Error, Result};
use crate::ports::OrderItemPort;

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price_cents: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            created_at: row.created_at,
        }
    }
}

/// Order item adapter bound to one session's transaction.
pub struct PgOrderItemAdapter {
    executor: Executor,
}

impl PgOrderItemAdapter {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl OrderItemPort for PgOrderItemAdapter {
    async fn create(&self, item: NewOrderItem) -> Result<OrderItem> {
        item.validate()?;
        let mut tx = self.executor.acquire().await?;
        let row: OrderItemRow = sqlx::query_as(
            "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price_cents) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, order_id, product_id, quantity, unit_price_cents, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            translate_insert(
                e,
                "order item",
                &[
                    ("order_items_order_fk", "order", item.order_id),
                    ("order_items_product_fk", "product", item.product_id),
                ],
            )
        })?;
        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> Result<OrderItem> {
        let mut tx = self.executor.acquire().await?;
        let row: OrderItemRow = sqlx::query_as(
            "SELECT id, order_id, product_id, quantity, unit_price_cents, created_at \
             FROM order_items WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| translate(e, "order item", id))?;
        Ok(row.into())
    }

    async fn list(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
        let mut tx = self.executor.acquire().await?;
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT id, order_id, product_id, quantity, unit_price_cents, created_at \
             FROM order_items WHERE order_id = $1 ORDER BY seq",
        )
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.executor.acquire().await?;
        let result = sqlx::query("DELETE FROM order_items WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("order item", id));
        }
        Ok(())
    }
}
