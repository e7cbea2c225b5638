use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Cart, CartFilter, CartUpdate, NewCart};
use crate::error::Result;

#[async_trait]
pub trait CartPort: Send + Sync {
    async fn create(&self, cart: NewCart) -> Result<Cart>;

    async fn get(&self, id: Uuid) -> Result<Cart>;

    /// Carts ordered by creation time, oldest first.
    async fn list(&self, filter: CartFilter) -> Result<Vec<Cart>>;

    async fn update(&self, id: Uuid, update: CartUpdate) -> Result<Cart>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}
