use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewOrderItem, OrderItem};
use crate::error::Result;

#[async_trait]
pub trait OrderItemPort: Send + Sync {
    async fn create(&self, item: NewOrderItem) -> Result<OrderItem>;

    async fn get(&self, id: Uuid) -> Result<OrderItem>;

    async fn list(&self, order_id: Uuid) -> Result<Vec<OrderItem>>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}
