use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{Json, Path};
use super::AppState;
use crate::domain::{Role, User};
use crate::error::Result;
use crate::services::{Identity, Login, ProfileUpdate};
use crate::unit_of_work::UnitOfWork;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileChange {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: Role,
}

pub async fn register<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state
        .accounts()
        .register(&body.username, &body.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    Json(body): Json<Credentials>,
) -> Result<Json<Login>> {
    let login = state.accounts().login(&body.username, &body.password).await?;
    Ok(Json(login))
}

pub async fn profile<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
) -> Result<Json<User>> {
    Ok(Json(state.accounts().profile(identity).await?))
}

pub async fn update_profile<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Json(body): Json<ProfileChange>,
) -> Result<Json<User>> {
    let update = ProfileUpdate {
        username: body.username,
        password: body.password,
    };
    Ok(Json(state.accounts().update_profile(identity, update).await?))
}

pub async fn list<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.accounts().list_users(identity).await?))
}

pub async fn assign_role<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Path(user_id): Path<Uuid>,
    Json(body): Json<RoleChange>,
) -> Result<Json<User>> {
    let user = state
        .accounts()
        .assign_role(identity, user_id, body.role)
        .await?;
    Ok(Json(user))
}
