use chrono::Utc;
use food_ordering_api::{
    config::AuthSettings,
    dto::{
        cart::AddToCartRequest,
        catalog::UpdateFoodRequest,
        orders::PlaceOrderRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{Food, OrderStatus, QuantityDelta, Role},
    services::{cart_service, catalog_service, order_service},
    state::AppState,
};
use uuid::Uuid;

fn state() -> AppState {
    AppState::in_memory(AuthSettings::new("test-secret"))
}

fn customer() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::User,
    }
}

fn admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Admin,
    }
}

async fn add_food(state: &AppState, name: &str, price: i64) -> Food {
    state
        .catalog
        .insert_food(Food {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            name: name.into(),
            image: None,
            price: Some(price),
            category: None,
            is_available: true,
            created_at: Utc::now(),
        })
        .await
        .expect("insert food")
}

fn adjust(food_id: Uuid, quantity: i32) -> AddToCartRequest {
    AddToCartRequest {
        food_id,
        quantity: QuantityDelta(quantity),
    }
}

fn checkout() -> PlaceOrderRequest {
    PlaceOrderRequest {
        address: "12 Main St".into(),
        payment_method: "COD".into(),
    }
}

#[tokio::test]
async fn add_adjust_and_checkout_flow() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let food = add_food(&state, "Dumplings", 100).await;

    let resp = cart_service::add_or_adjust(&state, &user, adjust(food.id, 2)).await?;
    let cart = resp.data.expect("cart");
    assert_eq!(cart.total_amount, 200);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);

    let resp = cart_service::add_or_adjust(&state, &user, adjust(food.id, -1)).await?;
    let cart = resp.data.expect("cart");
    assert_eq!(cart.total_amount, 100);
    assert_eq!(cart.items[0].quantity, 1);

    let resp = order_service::place_order(&state, &user, checkout()).await?;
    assert_eq!(resp.message, "Order placed");
    let order = resp.data.expect("order");
    assert_eq!(order.total_amount, 115);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name, "Dumplings");
    assert_eq!(order.items[0].price, 100);

    let resp = cart_service::fetch(&state, &user).await?;
    let cart = resp.data.expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total_amount, 0);
    assert!(state.carts.load_cart(user.user_id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn adding_same_food_merges_lines_in_insertion_order() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let rolls = add_food(&state, "Spring Rolls", 250).await;
    let rice = add_food(&state, "Fried Rice", 350).await;

    cart_service::add_or_adjust(&state, &user, adjust(rolls.id, 1)).await?;
    cart_service::add_or_adjust(&state, &user, adjust(rice.id, 2)).await?;
    let resp = cart_service::add_or_adjust(&state, &user, adjust(rolls.id, 3)).await?;

    let cart = resp.data.expect("cart");
    let ids: Vec<Uuid> = cart.items.iter().map(|line| line.food_id).collect();
    assert_eq!(ids, vec![rolls.id, rice.id]);
    assert_eq!(cart.items[0].quantity, 4);
    assert_eq!(cart.total_amount, 4 * 250 + 2 * 350);
    Ok(())
}

#[tokio::test]
async fn line_dropping_to_zero_is_removed() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let food = add_food(&state, "Tiramisu", 350).await;

    cart_service::add_or_adjust(&state, &user, adjust(food.id, 2)).await?;
    let resp = cart_service::add_or_adjust(&state, &user, adjust(food.id, -5)).await?;

    let cart = resp.data.expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total_amount, 0);
    Ok(())
}

#[tokio::test]
async fn exact_opposite_delta_removes_line() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let food = add_food(&state, "Pasta Carbonara", 480).await;

    cart_service::add_or_adjust(&state, &user, adjust(food.id, 3)).await?;
    let resp = cart_service::add_or_adjust(&state, &user, adjust(food.id, -3)).await?;

    let cart = resp.data.expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total_amount, 0);

    let stored = state.carts.load_cart(user.user_id).await?.expect("cart");
    assert!(stored.items.is_empty());
    assert_eq!(stored.total_amount, 0);
    Ok(())
}

#[tokio::test]
async fn existing_line_of_deleted_food_can_still_be_incremented() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let food = add_food(&state, "Vanilla Milkshake", 220).await;
    cart_service::add_or_adjust(&state, &user, adjust(food.id, 1)).await?;

    catalog_service::delete_food(&state, &admin(), food.id).await?;

    let resp = cart_service::add_or_adjust(&state, &user, adjust(food.id, 1)).await?;
    let cart = resp.data.expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    assert!(cart.items[0].food.is_none());
    assert_eq!(cart.total_amount, 0);

    let stored = state.carts.load_cart(user.user_id).await?.expect("cart");
    assert_eq!(stored.items[0].quantity, 2);
    Ok(())
}

#[tokio::test]
async fn existing_line_of_unavailable_food_can_still_be_incremented() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let mut food = add_food(&state, "Chocolate Lava Cake", 300).await;
    cart_service::add_or_adjust(&state, &user, adjust(food.id, 1)).await?;

    food.is_available = false;
    state.catalog.update_food(food.clone()).await?;

    let cart = cart_service::add_or_adjust(&state, &user, adjust(food.id, 2))
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.total_amount, 900);
    Ok(())
}

#[tokio::test]
async fn fetch_without_cart_returns_empty_placeholder() -> anyhow::Result<()> {
    let state = state();
    let resp = cart_service::fetch(&state, &customer()).await?;

    let cart = resp.data.expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total_amount, 0);
    assert!(cart.updated_at.is_none());
    assert_eq!(resp.meta.and_then(|m| m.total), Some(0));
    Ok(())
}

#[tokio::test]
async fn fetch_reprices_from_current_catalog() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let food = add_food(&state, "Garlic Bread", 200).await;
    cart_service::add_or_adjust(&state, &user, adjust(food.id, 2)).await?;

    catalog_service::update_food(
        &state,
        &admin(),
        food.id,
        UpdateFoodRequest {
            price: Some(300),
            ..Default::default()
        },
    )
    .await?;

    let cart = cart_service::fetch(&state, &user).await?.data.expect("cart");
    assert_eq!(cart.total_amount, 600);
    Ok(())
}

#[tokio::test]
async fn placed_order_keeps_snapshot_after_price_change() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let food = add_food(&state, "Pepperoni Feast", 650).await;
    cart_service::add_or_adjust(&state, &user, adjust(food.id, 1)).await?;
    let placed = order_service::place_order(&state, &user, checkout())
        .await?
        .data
        .expect("order");

    catalog_service::update_food(
        &state,
        &admin(),
        food.id,
        UpdateFoodRequest {
            name: Some("Pepperoni Deluxe".into()),
            price: Some(900),
            ..Default::default()
        },
    )
    .await?;

    let orders = order_service::list_user_orders(&state, &user)
        .await?
        .data
        .expect("orders");
    let order = &orders.items[0];
    assert_eq!(order.id, placed.id);
    assert_eq!(order.items[0].name, "Pepperoni Feast");
    assert_eq!(order.items[0].price, 650);
    assert_eq!(order.total_amount, 665);
    let current = order.items[0].food.as_ref().expect("food still exists");
    assert_eq!(current.price, Some(900));
    Ok(())
}

#[tokio::test]
async fn deleted_food_contributes_zero_and_snapshots_as_unknown() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let kept = add_food(&state, "Fries", 250).await;
    let gone = add_food(&state, "Milkshake", 220).await;
    cart_service::add_or_adjust(&state, &user, adjust(kept.id, 1)).await?;
    cart_service::add_or_adjust(&state, &user, adjust(gone.id, 1)).await?;

    catalog_service::delete_food(&state, &admin(), gone.id).await?;

    let cart = cart_service::fetch(&state, &user).await?.data.expect("cart");
    assert_eq!(cart.items.len(), 2);
    assert!(cart.items[1].food.is_none());
    assert_eq!(cart.total_amount, 250);

    let order = order_service::place_order(&state, &user, checkout())
        .await?
        .data
        .expect("order");
    assert_eq!(order.items[1].food_id, gone.id);
    assert_eq!(order.items[1].name, "Unknown Item");
    assert_eq!(order.items[1].price, 0);
    assert_eq!(order.total_amount, 265);
    Ok(())
}

#[tokio::test]
async fn adding_unknown_or_unavailable_food_is_rejected() -> anyhow::Result<()> {
    let state = state();
    let user = customer();

    let err = cart_service::add_or_adjust(&state, &user, adjust(Uuid::new_v4(), 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Food")));

    let mut food = add_food(&state, "Sold Out", 100).await;
    food.is_available = false;
    state.catalog.update_food(food.clone()).await?;

    let err = cart_service::add_or_adjust(&state, &user, adjust(food.id, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(state.carts.load_cart(user.user_id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn remove_line_requires_existing_cart() -> anyhow::Result<()> {
    let state = state();
    let user = customer();

    let err = cart_service::remove_line(&state, &user, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Cart")));

    let food = add_food(&state, "Spring Rolls", 250).await;
    cart_service::add_or_adjust(&state, &user, adjust(food.id, 2)).await?;

    // Absent food ids leave the cart as it was.
    let resp = cart_service::remove_line(&state, &user, Uuid::new_v4()).await?;
    assert_eq!(resp.data.expect("cart").total_amount, 500);

    let resp = cart_service::remove_line(&state, &user, food.id).await?;
    assert_eq!(resp.message, "Removed from cart");
    let cart = resp.data.expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total_amount, 0);
    Ok(())
}

#[tokio::test]
async fn carts_are_isolated_per_owner() -> anyhow::Result<()> {
    let state = state();
    let alice = customer();
    let bob = customer();
    let food = add_food(&state, "Kung Pao Chicken", 450).await;

    cart_service::add_or_adjust(&state, &alice, adjust(food.id, 2)).await?;

    let bob_cart = cart_service::fetch(&state, &bob).await?.data.expect("cart");
    assert!(bob_cart.items.is_empty());

    let err = order_service::place_order(&state, &bob, checkout())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let alice_cart = cart_service::fetch(&state, &alice).await?.data.expect("cart");
    assert_eq!(alice_cart.total_amount, 900);
    Ok(())
}

#[tokio::test]
async fn checkout_requires_address_and_payment_method() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let food = add_food(&state, "Dim Sum Platter", 600).await;
    cart_service::add_or_adjust(&state, &user, adjust(food.id, 1)).await?;

    let err = order_service::place_order(
        &state,
        &user,
        PlaceOrderRequest {
            address: "  ".into(),
            payment_method: "COD".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::place_order(
        &state,
        &user,
        PlaceOrderRequest {
            address: "12 Main St".into(),
            payment_method: String::new(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // The cart survives a rejected checkout.
    assert!(state.carts.load_cart(user.user_id).await?.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_are_not_lost() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let food = add_food(&state, "Fortune Cookies", 150).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let state = state.clone();
        let user = user.clone();
        handles.push(tokio::spawn(async move {
            cart_service::add_or_adjust(&state, &user, adjust(food.id, 1)).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let cart = cart_service::fetch(&state, &user).await?.data.expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 20);
    assert_eq!(cart.total_amount, 20 * 150);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_place_one_order() -> anyhow::Result<()> {
    let state = state();
    let user = customer();
    let food = add_food(&state, "Tiramisu", 350).await;
    cart_service::add_or_adjust(&state, &user, adjust(food.id, 1)).await?;

    let first = {
        let (state, user) = (state.clone(), user.clone());
        tokio::spawn(async move { order_service::place_order(&state, &user, checkout()).await })
    };
    let second = {
        let (state, user) = (state.clone(), user.clone());
        tokio::spawn(async move { order_service::place_order(&state, &user, checkout()).await })
    };

    let results = [first.await?, second.await?];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

    let orders = state.orders.list_orders_by_owner(user.user_id).await?;
    assert_eq!(orders.len(), 1);
    Ok(())
}
