//! Port contracts: one persistence trait per entity.
//!
//! Ports are always obtained from a [`UnitOfWorkSession`](crate::UnitOfWorkSession),
//! so every call made through them belongs to that session's transaction.

pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use cart::CartPort;
pub use cart_item::CartItemPort;
pub use order::OrderPort;
pub use order_item::OrderItemPort;
pub use product::ProductPort;
pub use user::UserPort;
