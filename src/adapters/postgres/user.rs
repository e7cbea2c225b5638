use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{translate, Executor};
use crate::domain::{NewUser, User, UserFilter, UserUpdate};
use crate::error::{Error, Result};
use crate::ports::UserPort;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = row
            .role
            .parse()
            .map_err(|_| Error::Internal(format!("invalid role '{}' stored for user {}", row.role, row.id)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

/// User adapter bound to one session's transaction.
pub struct PgUserAdapter {
    executor: Executor,
}

impl PgUserAdapter {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl UserPort for PgUserAdapter {
    async fn create(&self, user: NewUser) -> Result<User> {
        user.validate()?;
        let mut tx = self.executor.acquire().await?;
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (id, username, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING id, username, password_hash, role, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| translate(e, "user", &user.username))?;
        row.try_into()
    }

    async fn get(&self, id: Uuid) -> Result<User> {
        let mut tx = self.executor.acquire().await?;
        let row: UserRow = sqlx::query_as(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| translate(e, "user", id))?;
        row.try_into()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut tx = self.executor.acquire().await?;
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&mut **tx)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>> {
        let mut tx = self.executor.acquire().await?;
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, username, password_hash, role, created_at FROM users \
             WHERE ($1::TEXT IS NULL OR role = $1) ORDER BY created_at, username",
        )
        .bind(filter.role.map(|role| role.as_str()))
        .fetch_all(&mut **tx)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn update(&self, id: Uuid, update: UserUpdate) -> Result<User> {
        update.validate()?;
        let mut tx = self.executor.acquire().await?;
        let row: UserRow = sqlx::query_as(
            "UPDATE users SET \
                 username = COALESCE($2, username), \
                 password_hash = COALESCE($3, password_hash), \
                 role = COALESCE($4, role) \
             WHERE id = $1 \
             RETURNING id, username, password_hash, role, created_at",
        )
        .bind(id)
        .bind(update.username.as_deref())
        .bind(update.password_hash.as_deref())
        .bind(update.role.map(|role| role.as_str()))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| translate(e, "user", id))?;
        row.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.executor.acquire().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| translate(e, "user", id))?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("user", id));
        }
        Ok(())
    }
}
