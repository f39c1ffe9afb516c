use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{CreateRestaurantRequest, RestaurantList, RestaurantQuery, UpdateRestaurantRequest},
    error::AppResult,
    extract::ApiJson,
    middleware::auth::AuthUser,
    models::Restaurant,
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_restaurants).post(create_restaurant))
        .route(
            "/{id}",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
}

#[utoipa::path(
    get,
    path = "/api/restaurants",
    params(RestaurantQuery),
    responses(
        (status = 200, description = "Active restaurants, or all with ?all=true", body = ApiResponse<RestaurantList>)
    ),
    tag = "Restaurants"
)]
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(query): Query<RestaurantQuery>,
) -> AppResult<Json<ApiResponse<RestaurantList>>> {
    let resp = catalog_service::list_restaurants(&state, query.all.unwrap_or(false)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restaurants/{id}",
    params(
        ("id" = Uuid, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 200, description = "Restaurant", body = ApiResponse<Restaurant>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Restaurants"
)]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = catalog_service::get_restaurant(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant created", body = ApiResponse<Restaurant>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn create_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateRestaurantRequest>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = catalog_service::create_restaurant(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/restaurants/{id}",
    params(
        ("id" = Uuid, Path, description = "Restaurant ID")
    ),
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant updated", body = ApiResponse<Restaurant>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn update_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateRestaurantRequest>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = catalog_service::update_restaurant(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/restaurants/{id}",
    params(
        ("id" = Uuid, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalog_service::delete_restaurant(&state, &user, id).await?;
    Ok(Json(resp))
}
