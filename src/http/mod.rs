//! JSON-over-HTTP surface built on axum.
//!
//! Handlers are generic over the [`UnitOfWork`] so the same router serves
//! the PostgreSQL and the in-memory backend.

mod accounts;
mod auth;
mod carts;
mod error;
mod extract;
mod orders;
mod products;

use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::services::{AccountService, CartService, CatalogService, OrderService, TokenService};
use crate::unit_of_work::UnitOfWork;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
pub struct AppState<U> {
    inner: Arc<AppStateInner<U>>,
}

struct AppStateInner<U> {
    accounts: AccountService<U>,
    catalog: CatalogService<U>,
    carts: CartService<U>,
    orders: OrderService<U>,
}

impl<U> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<U: UnitOfWork> AppState<U> {
    pub fn new(uow: Arc<U>, tokens: TokenService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                accounts: AccountService::new(Arc::clone(&uow), tokens),
                catalog: CatalogService::new(Arc::clone(&uow)),
                carts: CartService::new(Arc::clone(&uow)),
                orders: OrderService::new(uow),
            }),
        }
    }

    pub fn accounts(&self) -> &AccountService<U> {
        &self.inner.accounts
    }

    pub fn catalog(&self) -> &CatalogService<U> {
        &self.inner.catalog
    }

    pub fn carts(&self) -> &CartService<U> {
        &self.inner.carts
    }

    pub fn orders(&self) -> &OrderService<U> {
        &self.inner.orders
    }

    pub fn tokens(&self) -> &TokenService {
        self.inner.accounts.tokens()
    }
}

/// Builds the application router.
pub fn router<U: UnitOfWork>(state: AppState<U>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", post(accounts::register::<U>).get(accounts::list::<U>))
        .route("/login", post(accounts::login::<U>))
        .route(
            "/users/me",
            get(accounts::profile::<U>).patch(accounts::update_profile::<U>),
        )
        .route("/users/{id}/role", put(accounts::assign_role::<U>))
        .route(
            "/products",
            get(products::list::<U>).post(products::create::<U>),
        )
        .route(
            "/products/{id}",
            get(products::get::<U>)
                .patch(products::update::<U>)
                .delete(products::delete::<U>),
        )
        .route("/cart", get(carts::current::<U>))
        .route("/carts", get(carts::list::<U>).post(carts::create::<U>))
        .route("/carts/{id}", get(carts::get::<U>))
        .route("/carts/{id}/items", post(carts::add_item::<U>))
        .route(
            "/carts/{id}/items/{item_id}",
            patch(carts::update_item::<U>).delete(carts::remove_item::<U>),
        )
        .route("/orders", post(orders::place::<U>).get(orders::list::<U>))
        .route("/orders/{id}", get(orders::get::<U>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
