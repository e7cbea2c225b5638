mod common;

use shop_unit_of_work::adapters::MemoryUnitOfWork;
use shop_unit_of_work::domain::Role;
use shop_unit_of_work::Error;

use common::Shop;

fn shop() -> Shop<MemoryUnitOfWork> {
    Shop::new(MemoryUnitOfWork::new())
}

#[tokio::test]
async fn test_checkout_converts_cart_into_order() {
    // Setup
    let shop = shop();
    let (_, admin) = shop.user(Role::Admin).await;
    let (_, customer) = shop.user(Role::User).await;
    let laptop = shop.product(admin, 120_000, 5).await;
    let mouse = shop.product(admin, 2_500, 10).await;

    let cart = shop.carts.current_cart(customer).await.expect("Failed to open cart");
    shop.carts
        .add_item(customer, cart.cart.id, laptop.id, 2)
        .await
        .expect("Failed to add laptop");
    shop.carts
        .add_item(customer, cart.cart.id, mouse.id, 3)
        .await
        .expect("Failed to add mouse");

    // Checkout
    let details = shop
        .orders
        .place_order(customer, cart.cart.id)
        .await
        .expect("Failed to place order");

    // Verify order contents and snapshotted prices
    assert_eq!(details.order.user_id, customer.user_id);
    assert_eq!(details.items.len(), 2);
    assert_eq!(details.total_cents, 2 * 120_000 + 3 * 2_500);
    let laptop_line = details
        .items
        .iter()
        .find(|item| item.product_id == laptop.id)
        .expect("Laptop line missing");
    assert_eq!(laptop_line.quantity, 2);
    assert_eq!(laptop_line.unit_price_cents, 120_000);

    // Verify stock was decremented exactly
    assert_eq!(shop.stock_of(laptop.id).await, 3);
    assert_eq!(shop.stock_of(mouse.id).await, 7);

    // Verify the cart is empty
    let cart = shop
        .carts
        .get_cart(customer, cart.cart.id)
        .await
        .expect("Failed to reload cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total_cents, 0);

    // Verify the order is readable and listed
    let reloaded = shop
        .orders
        .get_order(customer, details.order.id)
        .await
        .expect("Failed to load order");
    assert_eq!(reloaded, details);
    let orders = shop.orders.list_orders(customer).await.expect("Failed to list orders");
    assert_eq!(orders, vec![details.order.clone()]);
}

#[tokio::test]
async fn test_later_price_change_does_not_touch_order() {
    let shop = shop();
    let (_, admin) = shop.user(Role::Admin).await;
    let (_, customer) = shop.user(Role::User).await;
    let book = shop.product(admin, 1_999, 4).await;

    let cart = shop.carts.create_cart(customer).await.expect("Failed to create cart");
    shop.carts
        .add_item(customer, cart.id, book.id, 1)
        .await
        .expect("Failed to add item");
    let details = shop
        .orders
        .place_order(customer, cart.id)
        .await
        .expect("Failed to place order");

    shop.catalog
        .update_product(
            admin,
            book.id,
            shop_unit_of_work::domain::ProductUpdate {
                price_cents: Some(2_999),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update price");

    let reloaded = shop
        .orders
        .get_order(customer, details.order.id)
        .await
        .expect("Failed to load order");
    assert_eq!(reloaded.items[0].unit_price_cents, 1_999);
    assert_eq!(reloaded.total_cents, 1_999);
}

#[tokio::test]
async fn test_empty_cart_checkout_creates_no_order() {
    let shop = shop();
    let (_, customer) = shop.user(Role::User).await;
    let cart = shop.carts.create_cart(customer).await.expect("Failed to create cart");

    let result = shop.orders.place_order(customer, cart.id).await;

    assert!(matches!(result, Err(Error::EmptyCart(id)) if id == cart.id));
    let orders = shop.orders.list_orders(customer).await.expect("Failed to list orders");
    assert!(orders.is_empty(), "No order should be created");
}

#[tokio::test]
async fn test_insufficient_stock_rolls_back_everything() {
    // Setup
    let shop = shop();
    let (_, admin) = shop.user(Role::Admin).await;
    let (_, customer) = shop.user(Role::User).await;
    let plenty = shop.product(admin, 500, 10).await;
    let scarce = shop.product(admin, 900, 1).await;

    let cart = shop.carts.create_cart(customer).await.expect("Failed to create cart");
    shop.carts
        .add_item(customer, cart.id, plenty.id, 4)
        .await
        .expect("Failed to add item");
    shop.carts
        .add_item(customer, cart.id, scarce.id, 2)
        .await
        .expect("Failed to add item");

    // Checkout fails on the second line, after the first was decremented
    let result = shop.orders.place_order(customer, cart.id).await;
    match result {
        Err(Error::InsufficientStock {
            product_id,
            requested,
            available,
        }) => {
            assert_eq!(product_id, scarce.id);
            assert_eq!(requested, 2);
            assert_eq!(available, 1);
        }
        other => panic!("Expected InsufficientStock, got {other:?}"),
    }

    // Verify stock, cart and orders are unchanged
    assert_eq!(shop.stock_of(plenty.id).await, 10);
    assert_eq!(shop.stock_of(scarce.id).await, 1);
    let cart = shop.carts.get_cart(customer, cart.id).await.expect("Failed to reload cart");
    assert_eq!(cart.items.len(), 2);
    let orders = shop.orders.list_orders(customer).await.expect("Failed to list orders");
    assert!(orders.is_empty(), "Order should not persist after rollback");
}

#[tokio::test]
async fn test_only_owner_can_check_out() {
    let shop = shop();
    let (_, admin) = shop.user(Role::Admin).await;
    let (_, owner) = shop.user(Role::User).await;
    let (_, stranger) = shop.user(Role::User).await;
    let product = shop.product(admin, 100, 3).await;

    let cart = shop.carts.create_cart(owner).await.expect("Failed to create cart");
    shop.carts
        .add_item(owner, cart.id, product.id, 1)
        .await
        .expect("Failed to add item");

    for intruder in [stranger, admin] {
        let result = shop.orders.place_order(intruder, cart.id).await;
        assert!(matches!(result, Err(Error::Authorization(_))));
    }
    assert_eq!(shop.stock_of(product.id).await, 3);

    // Admins may read, strangers may not
    assert!(shop.carts.get_cart(admin, cart.id).await.is_ok());
    assert!(matches!(
        shop.carts.get_cart(stranger, cart.id).await,
        Err(Error::Authorization(_))
    ));
}

#[tokio::test]
async fn test_order_visibility() {
    let shop = shop();
    let (_, admin) = shop.user(Role::Admin).await;
    let (_, alice) = shop.user(Role::User).await;
    let (_, bob) = shop.user(Role::User).await;
    let product = shop.product(admin, 100, 10).await;

    let mut placed = Vec::new();
    for customer in [alice, bob] {
        let cart = shop.carts.create_cart(customer).await.expect("Failed to create cart");
        shop.carts
            .add_item(customer, cart.id, product.id, 1)
            .await
            .expect("Failed to add item");
        placed.push(
            shop.orders
                .place_order(customer, cart.id)
                .await
                .expect("Failed to place order"),
        );
    }

    let alice_orders = shop.orders.list_orders(alice).await.expect("Failed to list");
    assert_eq!(alice_orders.len(), 1);
    assert_eq!(alice_orders[0].user_id, alice.user_id);

    let all_orders = shop.orders.list_orders(admin).await.expect("Failed to list");
    assert_eq!(all_orders.len(), 2);

    assert!(matches!(
        shop.orders.get_order(bob, placed[0].order.id).await,
        Err(Error::Authorization(_))
    ));
    assert!(shop.orders.get_order(admin, placed[0].order.id).await.is_ok());
}

#[tokio::test]
async fn test_overflowing_order_total_rolls_back() {
    // Setup
    let shop = shop();
    let (_, admin) = shop.user(Role::Admin).await;
    let (_, customer) = shop.user(Role::User).await;
    let product = shop.product(admin, 100, 5).await;

    let cart = shop.carts.create_cart(customer).await.expect("Failed to create cart");
    shop.carts
        .add_item(customer, cart.id, product.id, 2)
        .await
        .expect("Failed to add item");

    // Price raised after the item was added
    shop.catalog
        .update_product(
            admin,
            product.id,
            shop_unit_of_work::domain::ProductUpdate {
                price_cents: Some(i64::MAX / 2 + 1),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update price");

    let result = shop.orders.place_order(customer, cart.id).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    // Verify stock and orders are unchanged
    assert_eq!(shop.stock_of(product.id).await, 5);
    let orders = shop.orders.list_orders(customer).await.expect("Failed to list orders");
    assert!(orders.is_empty(), "Order should not persist after rollback");
}
