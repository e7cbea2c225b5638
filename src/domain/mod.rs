//! Domain entities and the payloads used to create and update them.
//!
//! Payload `validate` methods are the single place where field-level
//! invariants live; both adapters call them before touching storage.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartFilter, CartItem, CartItemUpdate, CartUpdate, NewCart, NewCartItem};
pub use order::{NewOrder, NewOrderItem, Order, OrderFilter, OrderItem};
pub use product::{NewProduct, Product, ProductUpdate};
pub use user::{NewUser, Role, User, UserFilter, UserUpdate};
