use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewProduct, Product, ProductUpdate};
use crate::error::Result;

#[async_trait]
pub trait ProductPort: Send + Sync {
    async fn create(&self, product: NewProduct) -> Result<Product>;

    async fn get(&self, id: Uuid) -> Result<Product>;

    async fn list(&self) -> Result<Vec<Product>>;

    async fn update(&self, id: Uuid, update: ProductUpdate) -> Result<Product>;

    /// Fails with `Conflict` while an order item still references the product.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Atomically takes `quantity` units out of stock and returns the
    /// updated product, or fails with `InsufficientStock`.
    async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<Product>;
}
