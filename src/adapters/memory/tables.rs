use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::{
    Cart, CartFilter, CartItem, CartItemUpdate, CartUpdate, NewCart, NewCartItem, NewOrder,
    NewOrderItem, NewProduct, NewUser, Order, OrderFilter, OrderItem, Product, ProductUpdate,
    User, UserFilter, UserUpdate,
};
use crate::domain::product::validate_quantity;
use crate::error::{Error, Result};
use crate::ports::{CartItemPort, CartPort, OrderItemPort, OrderPort, ProductPort, UserPort};

/// Every table, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    users: Vec<User>,
    products: Vec<Product>,
    carts: Vec<Cart>,
    cart_items: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
}

impl MemoryState {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn product_exists(&self, id: Uuid) -> bool {
        self.products.iter().any(|p| p.id == id)
    }

    fn remove_carts(&mut self, cart_ids: &[Uuid]) {
        self.cart_items.retain(|item| !cart_ids.contains(&item.cart_id));
        self.carts.retain(|cart| !cart_ids.contains(&cart.id));
    }

    fn remove_orders(&mut self, order_ids: &[Uuid]) {
        self.order_items.retain(|item| !order_ids.contains(&item.order_id));
        self.orders.retain(|order| !order_ids.contains(&order.id));
    }
}

/// The working copy of one in-memory session; implements every port.
pub struct MemoryTables {
    state: Mutex<MemoryState>,
}

impl MemoryTables {
    pub fn new(state: MemoryState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn into_state(self) -> MemoryState {
        self.state.into_inner()
    }
}

fn find<'a, T>(rows: &'a [T], entity: &'static str, id: Uuid, key: impl Fn(&T) -> Uuid) -> Result<&'a T> {
    rows.iter()
        .find(|row| key(row) == id)
        .ok_or_else(|| Error::not_found(entity, id))
}

fn find_mut<'a, T>(
    rows: &'a mut [T],
    entity: &'static str,
    id: Uuid,
    key: impl Fn(&T) -> Uuid,
) -> Result<&'a mut T> {
    rows.iter_mut()
        .find(|row| key(row) == id)
        .ok_or_else(|| Error::not_found(entity, id))
}

fn remove<T>(rows: &mut Vec<T>, entity: &'static str, id: Uuid, key: impl Fn(&T) -> Uuid) -> Result<T> {
    let index = rows
        .iter()
        .position(|row| key(row) == id)
        .ok_or_else(|| Error::not_found(entity, id))?;
    Ok(rows.remove(index))
}

#[async_trait]
impl UserPort for MemoryTables {
    async fn create(&self, user: NewUser) -> Result<User> {
        user.validate()?;
        let mut state = self.state.lock();
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(Error::Conflict("user already exists".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<User> {
        let state = self.state.lock();
        find(&state.users, "user", id, |u| u.id).cloned()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.lock();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>> {
        let state = self.state.lock();
        Ok(state
            .users
            .iter()
            .filter(|u| filter.role.map_or(true, |role| u.role == role))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, update: UserUpdate) -> Result<User> {
        update.validate()?;
        let mut state = self.state.lock();
        if let Some(username) = &update.username {
            if state.users.iter().any(|u| u.id != id && &u.username == username) {
                return Err(Error::Conflict("user already exists".to_string()));
            }
        }
        let user = find_mut(&mut state.users, "user", id, |u| u.id)?;
        update.apply(user);
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        remove(&mut state.users, "user", id, |u| u.id)?;
        let carts: Vec<Uuid> = state.carts.iter().filter(|c| c.user_id == id).map(|c| c.id).collect();
        let orders: Vec<Uuid> = state.orders.iter().filter(|o| o.user_id == id).map(|o| o.id).collect();
        state.remove_carts(&carts);
        state.remove_orders(&orders);
        Ok(())
    }
}

#[async_trait]
impl ProductPort for MemoryTables {
    async fn create(&self, product: NewProduct) -> Result<Product> {
        product.validate()?;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            price_cents: product.price_cents,
            stock: product.stock,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().products.push(product.clone());
        Ok(product)
    }

    async fn get(&self, id: Uuid) -> Result<Product> {
        let state = self.state.lock();
        find(&state.products, "product", id, |p| p.id).cloned()
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let mut products = self.state.lock().products.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn update(&self, id: Uuid, update: ProductUpdate) -> Result<Product> {
        update.validate()?;
        let mut state = self.state.lock();
        let product = find_mut(&mut state.products, "product", id, |p| p.id)?;
        update.apply(product);
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        find(&state.products, "product", id, |p| p.id)?;
        if state.order_items.iter().any(|item| item.product_id == id) {
            return Err(Error::Conflict(format!(
                "product {id} is still referenced by other records"
            )));
        }
        state.cart_items.retain(|item| item.product_id != id);
        remove(&mut state.products, "product", id, |p| p.id)?;
        Ok(())
    }

    async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<Product> {
        validate_quantity(quantity)?;
        let mut state = self.state.lock();
        let product = find_mut(&mut state.products, "product", id, |p| p.id)?;
        if product.stock < quantity {
            return Err(Error::InsufficientStock {
                product_id: id,
                requested: quantity,
                available: product.stock,
            });
        }
        product.stock -= quantity;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }
}

#[async_trait]
impl CartPort for MemoryTables {
    async fn create(&self, cart: NewCart) -> Result<Cart> {
        let mut state = self.state.lock();
        if !state.user_exists(cart.user_id) {
            return Err(Error::not_found("user", cart.user_id));
        }
        let cart = Cart {
            id: Uuid::new_v4(),
            user_id: cart.user_id,
            created_at: Utc::now(),
        };
        state.carts.push(cart.clone());
        Ok(cart)
    }

    async fn get(&self, id: Uuid) -> Result<Cart> {
        let state = self.state.lock();
        find(&state.carts, "cart", id, |c| c.id).cloned()
    }

    async fn list(&self, filter: CartFilter) -> Result<Vec<Cart>> {
        let state = self.state.lock();
        Ok(state
            .carts
            .iter()
            .filter(|c| filter.user_id.map_or(true, |user_id| c.user_id == user_id))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, update: CartUpdate) -> Result<Cart> {
        let mut state = self.state.lock();
        if let Some(user_id) = update.user_id {
            if !state.user_exists(user_id) {
                return Err(Error::not_found("user", user_id));
            }
        }
        let cart = find_mut(&mut state.carts, "cart", id, |c| c.id)?;
        if let Some(user_id) = update.user_id {
            cart.user_id = user_id;
        }
        Ok(cart.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        find(&state.carts, "cart", id, |c| c.id)?;
        state.remove_carts(&[id]);
        Ok(())
    }
}

#[async_trait]
impl CartItemPort for MemoryTables {
    async fn create(&self, item: NewCartItem) -> Result<CartItem> {
        item.validate()?;
        let mut state = self.state.lock();
        find(&state.carts, "cart", item.cart_id, |c| c.id)?;
        if !state.product_exists(item.product_id) {
            return Err(Error::not_found("product", item.product_id));
        }
        let item = CartItem {
            id: Uuid::new_v4(),
            cart_id: item.cart_id,
            product_id: item.product_id,
            quantity: item.quantity,
            added_at: Utc::now(),
        };
        state.cart_items.push(item.clone());
        Ok(item)
    }

    async fn get(&self, id: Uuid) -> Result<CartItem> {
        let state = self.state.lock();
        find(&state.cart_items, "cart item", id, |i| i.id).cloned()
    }

    async fn list(&self, cart_id: Uuid) -> Result<Vec<CartItem>> {
        let state = self.state.lock();
        Ok(state
            .cart_items
            .iter()
            .filter(|item| item.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, update: CartItemUpdate) -> Result<CartItem> {
        update.validate()?;
        let mut state = self.state.lock();
        if let Some(product_id) = update.product_id {
            if !state.product_exists(product_id) {
                return Err(Error::not_found("product", product_id));
            }
        }
        let item = find_mut(&mut state.cart_items, "cart item", id, |i| i.id)?;
        update.apply(item);
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        remove(&mut state.cart_items, "cart item", id, |i| i.id)?;
        Ok(())
    }

    async fn clear(&self, cart_id: Uuid) -> Result<u64> {
        let mut state = self.state.lock();
        let before = state.cart_items.len();
        state.cart_items.retain(|item| item.cart_id != cart_id);
        Ok((before - state.cart_items.len()) as u64)
    }
}

#[async_trait]
impl OrderPort for MemoryTables {
    async fn create(&self, order: NewOrder) -> Result<Order> {
        let mut state = self.state.lock();
        if !state.user_exists(order.user_id) {
            return Err(Error::not_found("user", order.user_id));
        }
        let order = Order {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            created_at: Utc::now(),
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn get(&self, id: Uuid) -> Result<Order> {
        let state = self.state.lock();
        find(&state.orders, "order", id, |o| o.id).cloned()
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let state = self.state.lock();
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| filter.user_id.map_or(true, |user_id| o.user_id == user_id))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        find(&state.orders, "order", id, |o| o.id)?;
        state.remove_orders(&[id]);
        Ok(())
    }
}

#[async_trait]
impl OrderItemPort for MemoryTables {
    async fn create(&self, item: NewOrderItem) -> Result<OrderItem> {
        item.validate()?;
        let mut state = self.state.lock();
        find(&state.orders, "order", item.order_id, |o| o.id)?;
        if !state.product_exists(item.product_id) {
            return Err(Error::not_found("product", item.product_id));
        }
        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            created_at: Utc::now(),
        };
        state.order_items.push(item.clone());
        Ok(item)
    }

    async fn get(&self, id: Uuid) -> Result<OrderItem> {
        let state = self.state.lock();
        find(&state.order_items, "order item", id, |i| i.id).cloned()
    }

    async fn list(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
        let state = self.state.lock();
        Ok(state
            .order_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock();
        remove(&mut state.order_items, "order item", id, |i| i.id)?;
        Ok(())
    }
}
