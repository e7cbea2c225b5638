#![allow(dead_code)]

use std::sync::Arc;

use shop_unit_of_work::domain::{NewProduct, NewUser, Product, Role, User};
use shop_unit_of_work::services::{
    AccountService, CartService, CatalogService, Identity, OrderService, TokenService,
};
use shop_unit_of_work::{finish, UnitOfWork, UnitOfWorkSession};
use uuid::Uuid;

pub const JWT_SECRET: &[u8] = b"test-secret-0123456789abcdefghijklmnop";

pub fn tokens() -> TokenService {
    TokenService::new(JWT_SECRET, chrono::Duration::hours(1))
}

/// All services wired onto one unit of work.
pub struct Shop<U> {
    pub uow: Arc<U>,
    pub accounts: AccountService<U>,
    pub catalog: CatalogService<U>,
    pub carts: CartService<U>,
    pub orders: OrderService<U>,
}

impl<U: UnitOfWork> Shop<U> {
    pub fn new(uow: U) -> Self {
        let uow = Arc::new(uow);
        Self {
            accounts: AccountService::new(Arc::clone(&uow), tokens()),
            catalog: CatalogService::new(Arc::clone(&uow)),
            carts: CartService::new(Arc::clone(&uow)),
            orders: OrderService::new(Arc::clone(&uow)),
            uow,
        }
    }

    /// Inserts a user directly through the port, skipping password hashing.
    pub async fn user(&self, role: Role) -> (User, Identity) {
        let session = self.uow.begin().await.expect("Failed to begin transaction");
        let outcome = session
            .users()
            .create(NewUser {
                username: format!("user-{}", Uuid::new_v4()),
                password_hash: "not-a-real-hash".to_string(),
                role,
            })
            .await;
        let user = finish(session, outcome).await.expect("Failed to create user");
        let identity = Identity::new(user.id, user.role);
        (user, identity)
    }

    pub async fn product(&self, admin: Identity, price_cents: i64, stock: i32) -> Product {
        self.catalog
            .create_product(
                admin,
                NewProduct {
                    name: format!("product-{}", Uuid::new_v4()),
                    description: None,
                    price_cents,
                    stock,
                },
            )
            .await
            .expect("Failed to create product")
    }

    pub async fn stock_of(&self, product_id: Uuid) -> i32 {
        self.catalog
            .get_product(product_id)
            .await
            .expect("Failed to load product")
            .stock
    }
}
