//! Shopping cart service built on the Unit of Work pattern.
//!
//! Domain entities live in [`domain`]; [`ports`] declares one persistence
//! trait per entity; [`adapters`] implements them for PostgreSQL and for
//! process memory. A [`UnitOfWork`] opens a [`UnitOfWorkSession`] that
//! hands out every port bound to one transaction, which is what makes
//! checkout atomic. [`services`] holds the application logic and
//! [`http`] exposes it over axum.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod ports;
pub mod services;
pub mod telemetry;
pub mod unit_of_work;

pub use error::{Error, Result};
pub use unit_of_work::{finish, UnitOfWork, UnitOfWorkSession};
