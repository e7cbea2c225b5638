//! In-memory adapters.
//!
//! [`MemoryUnitOfWork`] keeps a committed snapshot behind an async mutex.
//! A session holds that mutex for its whole lifetime and works on a
//! private copy; `commit` publishes the copy and `rollback` (or dropping
//! the session) discards it. Sessions are therefore fully serialized.

mod tables;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::Result;
use crate::ports::{CartItemPort, CartPort, OrderItemPort, OrderPort, ProductPort, UserPort};
use crate::unit_of_work::{UnitOfWork, UnitOfWorkSession};

use tables::{MemoryState, MemoryTables};

/// UnitOfWork backed by process memory. Cloning shares the same store.
#[derive(Clone, Default)]
pub struct MemoryUnitOfWork {
    committed: Arc<Mutex<MemoryState>>,
}

impl MemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    type Session = MemoryUnitOfWorkSession;

    async fn begin(&self) -> Result<Self::Session> {
        let committed = self.committed.clone().lock_owned().await;
        let tables = MemoryTables::new((*committed).clone());
        Ok(MemoryUnitOfWorkSession { committed, tables })
    }
}

/// A serialized in-memory transaction.
pub struct MemoryUnitOfWorkSession {
    committed: OwnedMutexGuard<MemoryState>,
    tables: MemoryTables,
}

#[async_trait]
impl UnitOfWorkSession for MemoryUnitOfWorkSession {
    fn users(&self) -> &dyn UserPort {
        &self.tables
    }

    fn products(&self) -> &dyn ProductPort {
        &self.tables
    }

    fn carts(&self) -> &dyn CartPort {
        &self.tables
    }

    fn cart_items(&self) -> &dyn CartItemPort {
        &self.tables
    }

    fn orders(&self) -> &dyn OrderPort {
        &self.tables
    }

    fn order_items(&self) -> &dyn OrderItemPort {
        &self.tables
    }

    async fn commit(self) -> Result<()> {
        let Self {
            mut committed,
            tables,
        } = self;
        *committed = tables.into_state();
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}
