use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{translate, translate_insert, Executor};
use crate::domain::{CartItem, CartItemUpdate, NewCartItem};
use crate::error::{Error, Result};
use crate::ports::CartItemPort;

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    cart_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    added_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            quantity: row.quantity,
            added_at: row.added_at,
        }
    }
}

/// Cart item adapter bound to one session's transaction.
pub struct PgCartItemAdapter {
    executor: Executor,
}

impl PgCartItemAdapter {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl CartItemPort for PgCartItemAdapter {
    async fn create(&self, item: NewCartItem) -> Result<CartItem> {
        item.validate()?;
        let mut tx = self.executor.acquire().await?;
        let row: CartItemRow = sqlx::query_as(
            "INSERT INTO cart_items (id, cart_id, product_id, quantity) VALUES ($1, $2, $3, $4) \
             RETURNING id, cart_id, product_id, quantity, added_at",
        )
        .bind(Uuid::new_v4())
        .bind(item.cart_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            translate_insert(
                e,
                "cart item",
                &[
                    ("cart_items_cart_fk", "cart", item.cart_id),
                    ("cart_items_product_fk", "product", item.product_id),
                ],
            )
        })?;
        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> Result<CartItem> {
        let mut tx = self.executor.acquire().await?;
        let row: CartItemRow = sqlx::query_as(
            "SELECT id, cart_id, product_id, quantity, added_at FROM cart_items WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| translate(e, "cart item", id))?;
        Ok(row.into())
    }

    async fn list(&self, cart_id: Uuid) -> Result<Vec<CartItem>> {
        let mut tx = self.executor.acquire().await?;
        let rows: Vec<CartItemRow> = sqlx::query_as(
            "SELECT id, cart_id, product_id, quantity, added_at FROM cart_items \
             WHERE cart_id = $1 ORDER BY seq",
        )
        .bind(cart_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    async fn update(&self, id: Uuid, update: CartItemUpdate) -> Result<CartItem> {
        update.validate()?;
        let mut tx = self.executor.acquire().await?;
        let row: CartItemRow = sqlx::query_as(
            "UPDATE cart_items SET \
                 product_id = COALESCE($2, product_id), \
                 quantity = COALESCE($3, quantity) \
             WHERE id = $1 \
             RETURNING id, cart_id, product_id, quantity, added_at",
        )
        .bind(id)
        .bind(update.product_id)
        .bind(update.quantity)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| match update.product_id {
            Some(product_id) => translate_insert(
                e,
                "cart item",
                &[("cart_items_product_fk", "product", product_id)],
            ),
            None => translate(e, "cart item", id),
        })?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.executor.acquire().await?;
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("cart item", id));
        }
        Ok(())
    }

    async fn clear(&self, cart_id: Uuid) -> Result<u64> {
        let mut tx = self.executor.acquire().await?;
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
