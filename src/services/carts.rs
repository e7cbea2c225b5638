use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::access::Identity;
use crate::domain::product::{line_total_cents, sum_cents};
use crate::domain::{Cart, CartFilter, CartItem, CartItemUpdate, NewCart, NewCartItem};
use crate::error::{Error, Result};
use crate::unit_of_work::{finish, UnitOfWork, UnitOfWorkSession};

/// A cart line joined with the product it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub added_at: DateTime<Utc>,
}

/// A cart with its lines and the current total at catalog prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub cart: Cart,
    pub items: Vec<CartLine>,
    pub total_cents: i64,
}

pub struct CartService<U> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartService<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Returns the caller's oldest cart, creating one when they have none.
    #[instrument(skip(self))]
    pub async fn current_cart(&self, identity: Identity) -> Result<CartView> {
        let session = self.uow.begin().await?;
        let outcome = current_cart_in(&session, identity).await;
        finish(session, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn create_cart(&self, identity: Identity) -> Result<Cart> {
        let session = self.uow.begin().await?;
        let outcome = session
            .carts()
            .create(NewCart {
                user_id: identity.user_id,
            })
            .await;
        finish(session, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn list_carts(&self, identity: Identity) -> Result<Vec<Cart>> {
        let session = self.uow.begin().await?;
        let outcome = session
            .carts()
            .list(CartFilter {
                user_id: Some(identity.user_id),
            })
            .await;
        finish(session, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn get_cart(&self, identity: Identity, cart_id: Uuid) -> Result<CartView> {
        let session = self.uow.begin().await?;
        let outcome = get_cart_in(&session, identity, cart_id).await;
        finish(session, outcome).await
    }

    /// Adds a product to the cart, merging with an existing line for the
    /// same product.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        identity: Identity,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView> {
        NewCartItem {
            cart_id,
            product_id,
            quantity,
        }
        .validate()?;

        let session = self.uow.begin().await?;
        let outcome = add_item_in(&session, identity, cart_id, product_id, quantity).await;
        finish(session, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        identity: Identity,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartView> {
        let update = CartItemUpdate {
            quantity: Some(quantity),
            ..Default::default()
        };
        update.validate()?;

        let session = self.uow.begin().await?;
        let outcome = update_item_in(&session, identity, cart_id, item_id, update).await;
        finish(session, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        identity: Identity,
        cart_id: Uuid,
        item_id: Uuid,
    ) -> Result<CartView> {
        let session = self.uow.begin().await?;
        let outcome = remove_item_in(&session, identity, cart_id, item_id).await;
        finish(session, outcome).await
    }
}

async fn current_cart_in<S: UnitOfWorkSession>(session: &S, identity: Identity) -> Result<CartView> {
    let carts = session
        .carts()
        .list(CartFilter {
            user_id: Some(identity.user_id),
        })
        .await?;

    let cart = match carts.into_iter().next() {
        Some(cart) => cart,
        None => {
            let cart = session
                .carts()
                .create(NewCart {
                    user_id: identity.user_id,
                })
                .await?;
            debug!(cart_id = %cart.id, "created cart on first access");
            cart
        }
    };
    view(session, cart).await
}

async fn get_cart_in<S: UnitOfWorkSession>(
    session: &S,
    identity: Identity,
    cart_id: Uuid,
) -> Result<CartView> {
    let cart = session.carts().get(cart_id).await?;
    identity.require_owner_or_admin(cart.user_id, "cart")?;
    view(session, cart).await
}

async fn add_item_in<S: UnitOfWorkSession>(
    session: &S,
    identity: Identity,
    cart_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> Result<CartView> {
    let cart = owned_cart(session, identity, cart_id).await?;
    session.products().get(product_id).await?;

    let items = session.cart_items().list(cart_id).await?;
    match items.iter().find(|item| item.product_id == product_id) {
        Some(existing) => {
            let merged = existing
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| Error::validation("quantity is too large"))?;
            session
                .cart_items()
                .update(
                    existing.id,
                    CartItemUpdate {
                        quantity: Some(merged),
                        ..Default::default()
                    },
                )
                .await?;
        }
        None => {
            session
                .cart_items()
                .create(NewCartItem {
                    cart_id,
                    product_id,
                    quantity,
                })
                .await?;
        }
    }
    view(session, cart).await
}

async fn update_item_in<S: UnitOfWorkSession>(
    session: &S,
    identity: Identity,
    cart_id: Uuid,
    item_id: Uuid,
    update: CartItemUpdate,
) -> Result<CartView> {
    let cart = owned_cart(session, identity, cart_id).await?;
    item_in_cart(session, cart_id, item_id).await?;
    session.cart_items().update(item_id, update).await?;
    view(session, cart).await
}

async fn remove_item_in<S: UnitOfWorkSession>(
    session: &S,
    identity: Identity,
    cart_id: Uuid,
    item_id: Uuid,
) -> Result<CartView> {
    let cart = owned_cart(session, identity, cart_id).await?;
    item_in_cart(session, cart_id, item_id).await?;
    session.cart_items().delete(item_id).await?;
    view(session, cart).await
}

async fn owned_cart<S: UnitOfWorkSession>(
    session: &S,
    identity: Identity,
    cart_id: Uuid,
) -> Result<Cart> {
    let cart = session.carts().get(cart_id).await?;
    identity.require_owner(cart.user_id, "cart")?;
    Ok(cart)
}

async fn item_in_cart<S: UnitOfWorkSession>(
    session: &S,
    cart_id: Uuid,
    item_id: Uuid,
) -> Result<CartItem> {
    let item = session.cart_items().get(item_id).await?;
    if item.cart_id != cart_id {
        return Err(Error::not_found("cart item", item_id));
    }
    Ok(item)
}

async fn view<S: UnitOfWorkSession>(session: &S, cart: Cart) -> Result<CartView> {
    let items = session.cart_items().list(cart.id).await?;
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let product = session.products().get(item.product_id).await?;
        lines.push(CartLine {
            id: item.id,
            product_id: item.product_id,
            product_name: product.name,
            quantity: item.quantity,
            unit_price_cents: product.price_cents,
            line_total_cents: line_total_cents(product.price_cents, item.quantity)?,
            added_at: item.added_at,
        });
    }
    let total_cents = sum_cents(lines.iter().map(|line| line.line_total_cents))?;
    Ok(CartView {
        cart,
        items: lines,
        total_cents,
    })
}
