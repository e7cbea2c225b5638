use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::access::Identity;
use crate::domain::{NewProduct, Product, ProductUpdate};
use crate::error::{Error, Result};
use crate::unit_of_work::{finish, UnitOfWork, UnitOfWorkSession};

/// Product catalog. Reads are public; writes require the admin role,
/// checked before any session is opened.
pub struct CatalogService<U> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogService<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let session = self.uow.begin().await?;
        let outcome = session.products().list().await;
        finish(session, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<Product> {
        let session = self.uow.begin().await?;
        let outcome = session.products().get(id).await;
        finish(session, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, identity: Identity, product: NewProduct) -> Result<Product> {
        identity.require_admin("create products")?;
        product.validate()?;

        let session = self.uow.begin().await?;
        let outcome = session.products().create(product).await;
        let product = finish(session, outcome).await?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        identity: Identity,
        id: Uuid,
        update: ProductUpdate,
    ) -> Result<Product> {
        identity.require_admin("update products")?;
        if update.is_empty() {
            return Err(Error::validation("no fields to update"));
        }
        update.validate()?;

        let session = self.uow.begin().await?;
        let outcome = session.products().update(id, update).await;
        finish(session, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, identity: Identity, id: Uuid) -> Result<()> {
        identity.require_admin("delete products")?;

        let session = self.uow.begin().await?;
        let outcome = session.products().delete(id).await;
        finish(session, outcome).await?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }
}
