use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{CreateFoodRequest, FoodList, UpdateFoodRequest},
    error::AppResult,
    extract::ApiJson,
    middleware::auth::AuthUser,
    models::Food,
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};

// GET and POST take a restaurant id in the path, PUT and DELETE a food id.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(list_foods)
            .post(create_food)
            .put(update_food)
            .delete(delete_food),
    )
}

#[utoipa::path(
    get,
    path = "/api/foods/{restaurant_id}",
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 200, description = "Menu of a restaurant", body = ApiResponse<FoodList>)
    ),
    tag = "Foods"
)]
pub async fn list_foods(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FoodList>>> {
    let resp = catalog_service::list_foods(&state, restaurant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/foods/{restaurant_id}",
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant ID")
    ),
    request_body = CreateFoodRequest,
    responses(
        (status = 200, description = "Food created", body = ApiResponse<Food>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Restaurant not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Foods"
)]
pub async fn create_food(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    ApiJson(payload): ApiJson<CreateFoodRequest>,
) -> AppResult<Json<ApiResponse<Food>>> {
    let resp = catalog_service::create_food(&state, &user, restaurant_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/foods/{id}",
    params(
        ("id" = Uuid, Path, description = "Food ID")
    ),
    request_body = UpdateFoodRequest,
    responses(
        (status = 200, description = "Food updated", body = ApiResponse<Food>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Foods"
)]
pub async fn update_food(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateFoodRequest>,
) -> AppResult<Json<ApiResponse<Food>>> {
    let resp = catalog_service::update_food(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/foods/{id}",
    params(
        ("id" = Uuid, Path, description = "Food ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Foods"
)]
pub async fn delete_food(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalog_service::delete_food(&state, &user, id).await?;
    Ok(Json(resp))
}
