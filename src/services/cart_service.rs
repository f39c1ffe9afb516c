use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Cart,
    response::{ApiResponse, Meta},
    services::pricing::{resolve_lines, subtotal},
    state::AppState,
};

/// Adds `quantity` (signed) to the line for `food_id`, creating the cart on
/// first use. Lines that drop to zero or below disappear. Only a new line
/// needs its food to exist and be available.
#[tracing::instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn add_or_adjust(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let AddToCartRequest { food_id, quantity } = payload;

    let _guard = state.cart_locks.acquire(user.user_id).await;

    let mut cart = state
        .carts
        .load_cart(user.user_id)
        .await?
        .unwrap_or_else(|| Cart::empty(user.user_id));

    // Existing lines are adjusted even if their food has since been deleted.
    if quantity.is_positive() && cart.line(food_id).is_none() {
        let food = state
            .catalog
            .find_food_by_id(food_id)
            .await?
            .ok_or(AppError::NotFound("Food"))?;
        if !food.is_available {
            return Err(AppError::BadRequest(format!(
                "{} is not available",
                food.name
            )));
        }
    }

    cart.apply_delta(food_id, quantity)?;

    let view = recompute_and_save(state, cart).await?;
    tracing::info!(
        food_id = %food_id,
        delta = quantity.0,
        total = view.total_amount,
        "cart adjusted"
    );

    Ok(ApiResponse::success("Cart updated", view, Some(Meta::empty())))
}

/// Current cart with foods joined. A user without a cart gets the empty
/// placeholder.
pub async fn fetch(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let Some(cart) = state.carts.load_cart(user.user_id).await? else {
        return Ok(ApiResponse::success(
            "OK",
            CartView::empty(),
            Some(Meta::total(0)),
        ));
    };

    let lines = resolve_lines(state.catalog.as_ref(), &cart.items).await?;
    let total = subtotal(&lines);
    let mut view = CartView::from_resolved(&cart, lines);
    view.total_amount = total;

    let meta = Meta::total(view.items.len());
    Ok(ApiResponse::success("OK", view, Some(meta)))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn remove_line(
    state: &AppState,
    user: &AuthUser,
    food_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let _guard = state.cart_locks.acquire(user.user_id).await;

    let mut cart = state
        .carts
        .load_cart(user.user_id)
        .await?
        .ok_or(AppError::NotFound("Cart"))?;
    cart.remove_line(food_id);

    let view = recompute_and_save(state, cart).await?;
    tracing::info!(food_id = %food_id, total = view.total_amount, "cart line removed");

    Ok(ApiResponse::success("Removed from cart", view, Some(Meta::empty())))
}

async fn recompute_and_save(state: &AppState, mut cart: Cart) -> AppResult<CartView> {
    let lines = resolve_lines(state.catalog.as_ref(), &cart.items).await?;
    cart.total_amount = subtotal(&lines);
    cart.updated_at = Utc::now();
    state.carts.save_cart(&cart).await?;
    Ok(CartView::from_resolved(&cart, lines))
}
