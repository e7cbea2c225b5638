use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::product::validate_quantity;
use crate::error::Result;

/// A user's in-progress product selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewCart {
    pub user_id: Uuid,
}

/// Reassigns a cart to another owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartUpdate {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CartFilter {
    pub user_id: Option<Uuid>,
}

/// One product line inside a cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewCartItem {
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl NewCartItem {
    pub fn validate(&self) -> Result<()> {
        validate_quantity(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CartItemUpdate {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

impl CartItemUpdate {
    pub fn validate(&self) -> Result<()> {
        match self.quantity {
            Some(quantity) => validate_quantity(quantity),
            None => Ok(()),
        }
    }

    pub(crate) fn apply(self, item: &mut CartItem) {
        if let Some(product_id) = self.product_id {
            item.product_id = product_id;
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
    }
}
