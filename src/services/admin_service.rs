use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::orders::{OrderList, OrderView, UpdateOrderStatusRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::OrderStatus,
    response::{ApiResponse, Meta},
    services::order_service::{order_view, order_views},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let orders = state.orders.list_all_orders().await?;
    let items = order_views(state.catalog.as_ref(), orders).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

/// Overwrites the order's status. Any of the known labels is accepted from
/// any current status; nothing else about the order changes.
#[tracing::instrument(skip(state, user, payload), fields(admin_id = %user.user_id))]
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderView>> {
    ensure_admin(user)?;
    let status: OrderStatus = payload.status.parse()?;

    let order = state
        .orders
        .update_order_status(id, status, Utc::now())
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

    let view = order_view(state.catalog.as_ref(), order).await?;
    Ok(ApiResponse::success("Order updated", view, Some(Meta::empty())))
}
