use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{Json, Path};
use super::AppState;
use crate::domain::Cart;
use crate::error::Result;
use crate::services::{CartView, Identity};
use crate::unit_of_work::UnitOfWork;

#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantity {
    pub quantity: i32,
}

pub async fn current<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
) -> Result<Json<CartView>> {
    Ok(Json(state.carts().current_cart(identity).await?))
}

pub async fn list<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
) -> Result<Json<Vec<Cart>>> {
    Ok(Json(state.carts().list_carts(identity).await?))
}

pub async fn create<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
) -> Result<(StatusCode, Json<Cart>)> {
    let cart = state.carts().create_cart(identity).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

pub async fn get<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Path(cart_id): Path<Uuid>,
) -> Result<Json<CartView>> {
    Ok(Json(state.carts().get_cart(identity, cart_id).await?))
}

pub async fn add_item<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Path(cart_id): Path<Uuid>,
    Json(body): Json<AddItem>,
) -> Result<(StatusCode, Json<CartView>)> {
    let cart = state
        .carts()
        .add_item(identity, cart_id, body.product_id, body.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

pub async fn update_item<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<SetQuantity>,
) -> Result<Json<CartView>> {
    let cart = state
        .carts()
        .update_item(identity, cart_id, item_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

pub async fn remove_item<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CartView>> {
    let cart = state.carts().remove_item(identity, cart_id, item_id).await?;
    Ok(Json(cart))
}
