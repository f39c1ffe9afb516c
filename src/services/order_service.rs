use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::orders::{OrderList, OrderView, PlaceOrderRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{DELIVERY_FEE, Order, OrderLine, OrderStatus, UNKNOWN_ITEM_NAME},
    response::{ApiResponse, Meta},
    services::pricing::{ResolvedLine, resolve_lines},
    state::AppState,
    store::CatalogStore,
};

/// Turns the caller's cart into an order and deletes the cart.
///
/// Item name, image and price are copied from the catalog as it is right
/// now; the order never looks at the catalog for them again.
#[tracing::instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderView>> {
    let PlaceOrderRequest {
        address,
        payment_method,
    } = payload;
    if address.trim().is_empty() {
        return Err(AppError::BadRequest("address is required".into()));
    }
    if payment_method.trim().is_empty() {
        return Err(AppError::BadRequest("paymentMethod is required".into()));
    }

    let guard = state.cart_locks.acquire(user.user_id).await;

    let cart = state
        .carts
        .load_cart(user.user_id)
        .await?
        .filter(|cart| !cart.items.is_empty())
        .ok_or_else(|| AppError::BadRequest("Cart is empty".into()))?;

    let lines = resolve_lines(state.catalog.as_ref(), &cart.items).await?;
    let items: Vec<OrderLine> = lines.iter().map(snapshot).collect();
    let subtotal = items
        .iter()
        .fold(0_i64, |total, line| total.saturating_add(line.amount()));

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4(),
        owner: user.user_id,
        items,
        total_amount: subtotal.saturating_add(DELIVERY_FEE),
        delivery_address: address,
        payment_method,
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    state.orders.place_order(&order).await?;
    drop(guard);

    tracing::info!(
        order_id = %order.id,
        lines = order.items.len(),
        total = order.total_amount,
        "order placed"
    );

    let view = order_view(state.catalog.as_ref(), order).await?;
    Ok(ApiResponse::success("Order placed", view, Some(Meta::empty())))
}

pub async fn list_user_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    let orders = state.orders.list_orders_by_owner(user.user_id).await?;
    let items = order_views(state.catalog.as_ref(), orders).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

fn snapshot(line: &ResolvedLine) -> OrderLine {
    match &line.food {
        Some(food) => OrderLine {
            food_id: line.food_id,
            name: food.name.clone(),
            image: food.image.clone(),
            price: food.price.unwrap_or(0),
            quantity: line.quantity,
        },
        None => OrderLine {
            food_id: line.food_id,
            name: UNKNOWN_ITEM_NAME.to_string(),
            image: None,
            price: 0,
            quantity: line.quantity,
        },
    }
}

/// Joins each snapshot line with the food it came from, if it still exists.
pub(crate) async fn order_view(catalog: &dyn CatalogStore, order: Order) -> AppResult<OrderView> {
    let mut foods = Vec::with_capacity(order.items.len());
    for line in &order.items {
        foods.push(catalog.find_food_by_id(line.food_id).await?);
    }
    Ok(OrderView::new(order, foods))
}

pub(crate) async fn order_views(
    catalog: &dyn CatalogStore,
    orders: Vec<Order>,
) -> AppResult<Vec<OrderView>> {
    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        views.push(order_view(catalog, order).await?);
    }
    Ok(views)
}
