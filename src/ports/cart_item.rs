use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CartItem, CartItemUpdate, NewCartItem};
use crate::error::Result;

#[async_trait]
pub trait CartItemPort: Send + Sync {
    async fn create(&self, item: NewCartItem) -> Result<CartItem>;

    async fn get(&self, id: Uuid) -> Result<CartItem>;

    /// Items of one cart in the order they were added.
    async fn list(&self, cart_id: Uuid) -> Result<Vec<CartItem>>;

    async fn update(&self, id: Uuid, update: CartItemUpdate) -> Result<CartItem>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Removes every item of the cart and returns how many were removed.
    async fn clear(&self, cart_id: Uuid) -> Result<u64>;
}
