use std::path::Path;

use chrono::Utc;
use food_ordering_api::{
    config::AuthSettings,
    db::{create_orm_conn, run_migrations_from},
    dto::{
        auth::RegisterRequest,
        cart::AddToCartRequest,
        catalog::{CreateFoodRequest, CreateRestaurantRequest},
        orders::{PlaceOrderRequest, UpdateOrderStatusRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{OrderStatus, QuantityDelta, Role, User},
    services::{
        admin_service,
        auth_service::{hash_password, register_user},
        cart_service, catalog_service, order_service,
    },
    state::AppState,
};
use uuid::Uuid;

// Integration flow against PostgreSQL: admin builds a menu, user fills a cart and
// checks out, admin moves the order along.
#[tokio::test]
async fn cart_checkout_and_status_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let user_id = create_user(&state, Role::User).await?;
    let admin_id = create_user(&state, Role::Admin).await?;
    let customer = AuthUser {
        user_id,
        role: Role::User,
    };
    let admin = AuthUser {
        user_id: admin_id,
        role: Role::Admin,
    };

    let restaurant = catalog_service::create_restaurant(
        &state,
        &admin,
        CreateRestaurantRequest {
            name: "Test Kitchen".into(),
            image: None,
            description: None,
            address: Some("1 Test Lane".into()),
        },
    )
    .await?
    .data
    .expect("restaurant");

    let food = catalog_service::create_food(
        &state,
        &admin,
        restaurant.id,
        CreateFoodRequest {
            name: "Test Noodles".into(),
            image: None,
            price: Some(100),
            category: Some("Main Course".into()),
            is_available: true,
        },
    )
    .await?
    .data
    .expect("food");

    let cart = cart_service::add_or_adjust(
        &state,
        &customer,
        AddToCartRequest {
            food_id: food.id,
            quantity: QuantityDelta(2),
        },
    )
    .await?
    .data
    .expect("cart");
    assert_eq!(cart.total_amount, 200);

    let cart = cart_service::add_or_adjust(
        &state,
        &customer,
        AddToCartRequest {
            food_id: food.id,
            quantity: QuantityDelta(-1),
        },
    )
    .await?
    .data
    .expect("cart");
    assert_eq!(cart.total_amount, 100);
    assert_eq!(cart.items[0].quantity, 1);

    let order = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            address: "1 Test Lane".into(),
            payment_method: "COD".into(),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(order.total_amount, 115);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(state.carts.load_cart(user_id).await?.is_none());

    let updated = admin_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: "Out for Delivery".into(),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(updated.status, OrderStatus::OutForDelivery);

    let mine = order_service::list_user_orders(&state, &customer)
        .await?
        .data
        .expect("orders");
    assert_eq!(mine.items.len(), 1);
    assert_eq!(mine.items[0].items[0].name, "Test Noodles");
    assert_eq!(mine.items[0].items[0].price, 100);

    Ok(())
}

async fn create_user(state: &AppState, role: Role) -> anyhow::Result<Uuid> {
    let user = User {
        id: Uuid::new_v4(),
        name: format!("{} tester", role.as_str()),
        email: format!("{}+{}@example.com", role.as_str(), Uuid::new_v4()),
        password_hash: hash_password("secret")?,
        role,
        created_at: Utc::now(),
    };
    let user = state.users.insert_user(user).await?;
    Ok(user.id)
}

#[tokio::test]
async fn concurrent_registrations_with_same_email_conflict_cleanly() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let email = format!("race+{}@example.com", Uuid::new_v4());
    let request = || RegisterRequest {
        name: "Racer".into(),
        email: email.clone(),
        password: "secret".into(),
    };

    let (first, second) = tokio::join!(
        register_user(&state, request()),
        register_user(&state, request())
    );
    let results = [first, second];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in &results {
        if let Err(err) = result {
            assert!(
                matches!(err, AppError::BadRequest(msg) if msg == "Email already exists"),
                "unexpected error: {err:?}"
            );
        }
    }
    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let conn = create_orm_conn(&database_url).await?;
    run_migrations_from(&conn, &Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")).await?;
    Ok(Some(AppState::with_orm(conn, AuthSettings::new("pg-test-secret"))))
}
