use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{translate, translate_insert, Executor};
use crate::domain::{Cart, CartFilter, CartUpdate, NewCart};
use crate::error::{Error, Result};
use crate::ports::CartPort;

#[derive(sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Cart {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

/// Cart adapter bound to one session's transaction.
pub struct PgCartAdapter {
    executor: Executor,
}

impl PgCartAdapter {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl CartPort for PgCartAdapter {
    async fn create(&self, cart: NewCart) -> Result<Cart> {
        let mut tx = self.executor.acquire().await?;
        let row: CartRow = sqlx::query_as(
            "INSERT INTO carts (id, user_id) VALUES ($1, $2) RETURNING id, user_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(cart.user_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| translate_insert(e, "cart", &[("carts_user_fk", "user", cart.user_id)]))?;
        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> Result<Cart> {
        let mut tx = self.executor.acquire().await?;
        let row: CartRow = sqlx::query_as("SELECT id, user_id, created_at FROM carts WHERE id = $1")
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| translate(e, "cart", id))?;
        Ok(row.into())
    }

    async fn list(&self, filter: CartFilter) -> Result<Vec<Cart>> {
        let mut tx = self.executor.acquire().await?;
        let rows: Vec<CartRow> = sqlx::query_as(
            "SELECT id, user_id, created_at FROM carts \
             WHERE ($1::UUID IS NULL OR user_id = $1) ORDER BY seq",
        )
        .bind(filter.user_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(Cart::from).collect())
    }

    async fn update(&self, id: Uuid, update: CartUpdate) -> Result<Cart> {
        let mut tx = self.executor.acquire().await?;
        let row: CartRow = sqlx::query_as(
            "UPDATE carts SET user_id = COALESCE($2, user_id) WHERE id = $1 \
             RETURNING id, user_id, created_at",
        )
        .bind(id)
        .bind(update.user_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| match update.user_id {
            Some(user_id) => translate_insert(e, "cart", &[("carts_user_fk", "user", user_id)]),
            None => translate(e, "cart", id),
        })?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.executor.acquire().await?;
        let result = sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| translate(e, "cart", id))?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("cart", id));
        }
        Ok(())
    }
}
