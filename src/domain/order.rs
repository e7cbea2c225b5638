use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::product::{line_total_cents, validate_quantity};
use crate::error::{Error, Result};

/// An immutable purchase record created at checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewOrder {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
}

/// One product line of an order. `unit_price_cents` is the product price
/// at checkout time and is never recalculated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn line_total_cents(&self) -> Result<i64> {
        line_total_cents(self.unit_price_cents, self.quantity)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl NewOrderItem {
    pub fn validate(&self) -> Result<()> {
        validate_quantity(self.quantity)?;
        if self.unit_price_cents < 0 {
            return Err(Error::validation("price cannot be negative"));
        }
        Ok(())
    }
}
