use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::access::Identity;
use crate::domain::product::sum_cents;
use crate::domain::{NewOrder, NewOrderItem, Order, OrderFilter, OrderItem};
use crate::error::{Error, Result};
use crate::unit_of_work::{finish, UnitOfWork, UnitOfWorkSession};

/// An order with its items and the total charged at checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub total_cents: i64,
}

impl OrderDetails {
    fn new(order: Order, items: Vec<OrderItem>) -> Result<Self> {
        let lines = items
            .iter()
            .map(OrderItem::line_total_cents)
            .collect::<Result<Vec<_>>>()?;
        let total_cents = sum_cents(lines)?;
        Ok(Self {
            order,
            items,
            total_cents,
        })
    }
}

pub struct OrderService<U> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderService<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Converts the cart into an order.
    ///
    /// Stock decrements, order rows and the emptied cart are written in
    /// one session: either all of them are committed or none is.
    #[instrument(skip(self))]
    pub async fn place_order(&self, identity: Identity, cart_id: Uuid) -> Result<OrderDetails> {
        let session = self.uow.begin().await?;
        let outcome = checkout(&session, identity, cart_id).await;
        if let Err(err) = &outcome {
            warn!(error = %err, "checkout aborted");
        }
        let details = finish(session, outcome).await?;
        info!(
            order_id = %details.order.id,
            items = details.items.len(),
            total_cents = details.total_cents,
            "order placed"
        );
        Ok(details)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, identity: Identity, order_id: Uuid) -> Result<OrderDetails> {
        let session = self.uow.begin().await?;
        let outcome = load_order(&session, identity, order_id).await;
        finish(session, outcome).await
    }

    /// Lists the caller's orders, newest first. Admins see every order.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, identity: Identity) -> Result<Vec<Order>> {
        let filter = OrderFilter {
            user_id: (!identity.is_admin()).then_some(identity.user_id),
        };
        let session = self.uow.begin().await?;
        let outcome = session.orders().list(filter).await;
        finish(session, outcome).await
    }
}

async fn checkout<S: UnitOfWorkSession>(
    session: &S,
    identity: Identity,
    cart_id: Uuid,
) -> Result<OrderDetails> {
    let cart = session.carts().get(cart_id).await?;
    identity.require_owner(cart.user_id, "cart")?;

    let lines = session.cart_items().list(cart_id).await?;
    if lines.is_empty() {
        return Err(Error::EmptyCart(cart_id));
    }

    let order = session
        .orders()
        .create(NewOrder {
            user_id: identity.user_id,
        })
        .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        let product = session
            .products()
            .decrement_stock(line.product_id, line.quantity)
            .await?;
        let item = session
            .order_items()
            .create(NewOrderItem {
                order_id: order.id,
                product_id: product.id,
                quantity: line.quantity,
                unit_price_cents: product.price_cents,
            })
            .await?;
        items.push(item);
    }

    // Validates the total before anything is committed
    let details = OrderDetails::new(order, items)?;
    session.cart_items().clear(cart_id).await?;
    Ok(details)
}

async fn load_order<S: UnitOfWorkSession>(
    session: &S,
    identity: Identity,
    order_id: Uuid,
) -> Result<OrderDetails> {
    let order = session.orders().get(order_id).await?;
    identity.require_owner_or_admin(order.user_id, "order")?;
    let items = session.order_items().list(order.id).await?;
    OrderDetails::new(order, items)
}
