//! Port implementations.

pub mod memory;
pub mod postgres;

pub use memory::{MemoryUnitOfWork, MemoryUnitOfWorkSession};
pub use postgres::{PostgresUnitOfWork, PostgresUnitOfWorkSession};
