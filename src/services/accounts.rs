use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::access::Identity;
use super::credentials::{hash_password, reject_unknown_user, verify_password};
use super::tokens::{AccessToken, TokenService};
use crate::domain::{NewUser, Role, User, UserFilter, UserUpdate};
use crate::error::{Error, Result};
use crate::unit_of_work::{finish, UnitOfWork, UnitOfWorkSession};

/// A successful login.
#[derive(Debug, Clone, Serialize)]
pub struct Login {
    pub user: User,
    #[serde(flatten)]
    pub access: AccessToken,
}

/// Self-service profile change; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Registration, login and user administration.
pub struct AccountService<U> {
    uow: Arc<U>,
    tokens: TokenService,
}

impl<U: UnitOfWork> AccountService<U> {
    pub fn new(uow: Arc<U>, tokens: TokenService) -> Self {
        Self { uow, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Registers a regular user.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let new_user = NewUser {
            username: username.trim().to_string(),
            password_hash: hash_password(password)?,
            role: Role::User,
        };
        new_user.validate()?;

        let session = self.uow.begin().await?;
        let outcome = session.users().create(new_user).await;
        let user = finish(session, outcome).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Checks the credentials and issues an access token.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Login> {
        let session = self.uow.begin().await?;
        let outcome = session.users().find_by_username(username.trim()).await;
        let user = finish(session, outcome)
            .await?
            .ok_or_else(|| reject_unknown_user(password))?;

        verify_password(&user.password_hash, password)?;
        let access = self.tokens.issue(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(Login { user, access })
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, identity: Identity) -> Result<User> {
        let session = self.uow.begin().await?;
        let outcome = session.users().get(identity.user_id).await;
        finish(session, outcome).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, identity: Identity, update: ProfileUpdate) -> Result<User> {
        if update.username.is_none() && update.password.is_none() {
            return Err(Error::validation("no fields to update"));
        }
        let password_hash = match update.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };
        let update = UserUpdate {
            username: update.username.map(|name| name.trim().to_string()),
            password_hash,
            role: None,
        };
        update.validate()?;

        let session = self.uow.begin().await?;
        let outcome = session.users().update(identity.user_id, update).await;
        finish(session, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, identity: Identity) -> Result<Vec<User>> {
        identity.require_admin("list users")?;
        let session = self.uow.begin().await?;
        let outcome = session.users().list(UserFilter::default()).await;
        finish(session, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn assign_role(&self, identity: Identity, user_id: Uuid, role: Role) -> Result<User> {
        identity.require_admin("assign roles")?;
        let update = UserUpdate {
            role: Some(role),
            ..Default::default()
        };

        let session = self.uow.begin().await?;
        let outcome = session.users().update(user_id, update).await;
        let user = finish(session, outcome).await?;
        info!(user_id = %user.id, role = %user.role, "role assigned");
        Ok(user)
    }

    /// Creates the initial admin account unless an admin already exists.
    ///
    /// Returns the created user, or `None` when nothing had to be done.
    #[instrument(skip(self, password))]
    pub async fn seed_admin(&self, username: &str, password: &str) -> Result<Option<User>> {
        let password_hash = hash_password(password)?;

        let session = self.uow.begin().await?;
        let outcome = seed_admin_in(&session, username.trim(), password_hash).await;
        let created = finish(session, outcome).await?;
        if let Some(admin) = &created {
            info!(user_id = %admin.id, username = %admin.username, "admin user created");
        }
        Ok(created)
    }
}

async fn seed_admin_in<S: UnitOfWorkSession>(
    session: &S,
    username: &str,
    password_hash: String,
) -> Result<Option<User>> {
    let admins = session
        .users()
        .list(UserFilter {
            role: Some(Role::Admin),
        })
        .await?;
    if !admins.is_empty() {
        return Ok(None);
    }

    let admin = session
        .users()
        .create(NewUser {
            username: username.to_string(),
            password_hash,
            role: Role::Admin,
        })
        .await?;
    Ok(Some(admin))
}
