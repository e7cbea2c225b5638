use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{translate, Executor};
use crate::domain::product::validate_quantity;
use crate::domain::{NewProduct, Product, ProductUpdate};
use crate::error::{Error, Result};
use crate::ports::ProductPort;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price_cents: i64,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Product adapter bound to one session's transaction.
pub struct PgProductAdapter {
    executor: Executor,
}

impl PgProductAdapter {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ProductPort for PgProductAdapter {
    async fn create(&self, product: NewProduct) -> Result<Product> {
        product.validate()?;
        let mut tx = self.executor.acquire().await?;
        let row: ProductRow = sqlx::query_as(
            "INSERT INTO products (id, name, description, price_cents, stock) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, description, price_cents, stock, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.price_cents)
        .bind(product.stock)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| translate(e, "product", &product.name))?;
        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> Result<Product> {
        let mut tx = self.executor.acquire().await?;
        let row: ProductRow = sqlx::query_as(
            "SELECT id, name, description, price_cents, stock, created_at, updated_at \
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| translate(e, "product", id))?;
        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let mut tx = self.executor.acquire().await?;
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, description, price_cents, stock, created_at, updated_at \
             FROM products ORDER BY name, id",
        )
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update(&self, id: Uuid, update: ProductUpdate) -> Result<Product> {
        update.validate()?;
        let mut tx = self.executor.acquire().await?;
        let row: ProductRow = sqlx::query_as(
            "UPDATE products SET \
                 name = COALESCE($2, name), \
                 description = CASE WHEN $3 THEN $4 ELSE description END, \
                 price_cents = COALESCE($5, price_cents), \
                 stock = COALESCE($6, stock), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, description, price_cents, stock, created_at, updated_at",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.description.is_some())
        .bind(update.description.as_ref().and_then(|d| d.as_deref()))
        .bind(update.price_cents)
        .bind(update.stock)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| translate(e, "product", id))?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.executor.acquire().await?;
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| translate(e, "product", id))?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("product", id));
        }
        Ok(())
    }

    async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<Product> {
        validate_quantity(quantity)?;
        let mut tx = self.executor.acquire().await?;
        let updated: Option<ProductRow> = sqlx::query_as(
            "UPDATE products SET stock = stock - $2, updated_at = now() \
             WHERE id = $1 AND stock >= $2 \
             RETURNING id, name, description, price_cents, stock, created_at, updated_at",
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&mut **tx)
        .await?;
        if let Some(row) = updated {
            return Ok(row.into());
        }

        let available: Option<i32> = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        match available {
            Some(available) => Err(Error::InsufficientStock {
                product_id: id,
                requested: quantity,
                available,
            }),
            None => Err(Error::not_found("product", id)),
        }
    }
}
