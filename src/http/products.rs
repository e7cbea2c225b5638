use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use super::extract::{Json, Path};
use super::AppState;
use crate::domain::{NewProduct, Product, ProductUpdate};
use crate::error::Result;
use crate::services::Identity;
use crate::unit_of_work::UnitOfWork;

pub async fn list<U: UnitOfWork>(State(state): State<AppState<U>>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().list_products().await?))
}

pub async fn get<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().get_product(id).await?))
}

pub async fn create<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.catalog().create_product(identity, body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(body): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().update_product(identity, id, body).await?))
}

pub async fn delete<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.catalog().delete_product(identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
