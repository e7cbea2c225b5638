use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{Json, Path};
use super::AppState;
use crate::domain::Order;
use crate::error::Result;
use crate::services::{Identity, OrderDetails};
use crate::unit_of_work::UnitOfWork;

#[derive(Debug, Deserialize)]
pub struct Checkout {
    pub cart_id: Uuid,
}

pub async fn place<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Json(body): Json<Checkout>,
) -> Result<(StatusCode, Json<OrderDetails>)> {
    let order = state.orders().place_order(identity, body.cart_id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list_orders(identity).await?))
}

pub async fn get<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    identity: Identity,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetails>> {
    Ok(Json(state.orders().get_order(identity, order_id).await?))
}
