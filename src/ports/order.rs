use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewOrder, Order, OrderFilter};
use crate::error::Result;

/// Orders are immutable once created, so there is no update operation.
#[async_trait]
pub trait OrderPort: Send + Sync {
    async fn create(&self, order: NewOrder) -> Result<Order>;

    async fn get(&self, id: Uuid) -> Result<Order>;

    /// Orders ordered by creation time, newest first.
    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}
