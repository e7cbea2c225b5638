use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewUser, User, UserFilter, UserUpdate};
use crate::error::Result;

#[async_trait]
pub trait UserPort: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create(&self, user: NewUser) -> Result<User>;

    async fn get(&self, id: Uuid) -> Result<User>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>>;

    async fn update(&self, id: Uuid, update: UserUpdate) -> Result<User>;

    /// Deletes the user together with their carts and orders.
    async fn delete(&self, id: Uuid) -> Result<()>;
}
