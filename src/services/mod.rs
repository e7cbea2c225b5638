//! Application services.
//!
//! Each service holds the injected [`UnitOfWork`](crate::UnitOfWork) and
//! opens one session per operation, finishing it with
//! [`finish`](crate::finish) so that every exit path commits or rolls back.

pub mod access;
pub mod accounts;
pub mod carts;
pub mod catalog;
pub mod credentials;
pub mod orders;
pub mod tokens;

pub use access::Identity;
pub use accounts::{AccountService, Login, ProfileUpdate};
pub use carts::{CartLine, CartService, CartView};
pub use catalog::CatalogService;
pub use orders::{OrderDetails, OrderService};
pub use tokens::{AccessToken, TokenService};
