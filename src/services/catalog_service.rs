use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::catalog::{
        CreateFoodRequest, CreateRestaurantRequest, FoodList, RestaurantList, UpdateFoodRequest,
        UpdateRestaurantRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Food, Restaurant},
    response::{ApiResponse, Meta},
    state::AppState,
};

fn require_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    Ok(name.to_string())
}

fn validate_price(price: Option<i64>) -> AppResult<Option<i64>> {
    match price {
        Some(p) if p < 0 => Err(AppError::BadRequest("price must not be negative".into())),
        other => Ok(other),
    }
}

pub async fn list_restaurants(
    state: &AppState,
    include_inactive: bool,
) -> AppResult<ApiResponse<RestaurantList>> {
    let items = state.catalog.list_restaurants(include_inactive).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(meta),
    ))
}

pub async fn get_restaurant(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Restaurant>> {
    let restaurant = state
        .catalog
        .find_restaurant_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Restaurant"))?;
    Ok(ApiResponse::success("Restaurant", restaurant, None))
}

pub async fn create_restaurant(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    ensure_admin(user)?;
    let restaurant = Restaurant {
        id: Uuid::new_v4(),
        name: require_name(&payload.name)?,
        image: payload.image,
        description: payload.description,
        address: payload.address,
        is_active: true,
        created_at: Utc::now(),
    };
    let restaurant = state.catalog.insert_restaurant(restaurant).await?;

    tracing::info!(restaurant_id = %restaurant.id, "restaurant created");
    Ok(ApiResponse::success(
        "Restaurant created",
        restaurant,
        Some(Meta::empty()),
    ))
}

pub async fn update_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    ensure_admin(user)?;
    let mut restaurant = state
        .catalog
        .find_restaurant_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Restaurant"))?;

    if let Some(name) = payload.name {
        restaurant.name = require_name(&name)?;
    }
    if let Some(image) = payload.image {
        restaurant.image = Some(image);
    }
    if let Some(description) = payload.description {
        restaurant.description = Some(description);
    }
    if let Some(address) = payload.address {
        restaurant.address = Some(address);
    }
    if let Some(is_active) = payload.is_active {
        restaurant.is_active = is_active;
    }

    let restaurant = state
        .catalog
        .update_restaurant(restaurant)
        .await?
        .ok_or(AppError::NotFound("Restaurant"))?;

    tracing::info!(restaurant_id = %restaurant.id, "restaurant updated");
    Ok(ApiResponse::success(
        "Restaurant updated",
        restaurant,
        Some(Meta::empty()),
    ))
}

/// Foods of the restaurant stay in place; carts and orders holding them are
/// not touched.
pub async fn delete_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if !state.catalog.delete_restaurant(id).await? {
        return Err(AppError::NotFound("Restaurant"));
    }

    tracing::info!(restaurant_id = %id, "restaurant deleted");
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub async fn list_foods(state: &AppState, restaurant_id: Uuid) -> AppResult<ApiResponse<FoodList>> {
    let items = state.catalog.list_foods_by_restaurant(restaurant_id).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Foods", FoodList { items }, Some(meta)))
}

pub async fn create_food(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    payload: CreateFoodRequest,
) -> AppResult<ApiResponse<Food>> {
    ensure_admin(user)?;
    if state
        .catalog
        .find_restaurant_by_id(restaurant_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Restaurant"));
    }

    let food = Food {
        id: Uuid::new_v4(),
        restaurant_id,
        name: require_name(&payload.name)?,
        image: payload.image,
        price: validate_price(payload.price)?,
        category: payload.category,
        is_available: payload.is_available,
        created_at: Utc::now(),
    };
    let food = state.catalog.insert_food(food).await?;

    tracing::info!(food_id = %food.id, restaurant_id = %restaurant_id, "food created");
    Ok(ApiResponse::success("Food created", food, Some(Meta::empty())))
}

/// Price changes here never reach orders already placed.
pub async fn update_food(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateFoodRequest,
) -> AppResult<ApiResponse<Food>> {
    ensure_admin(user)?;
    let mut food = state
        .catalog
        .find_food_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Food"))?;

    if let Some(name) = payload.name {
        food.name = require_name(&name)?;
    }
    if let Some(image) = payload.image {
        food.image = Some(image);
    }
    if payload.price.is_some() {
        food.price = validate_price(payload.price)?;
    }
    if let Some(category) = payload.category {
        food.category = Some(category);
    }
    if let Some(is_available) = payload.is_available {
        food.is_available = is_available;
    }

    let food = state
        .catalog
        .update_food(food)
        .await?
        .ok_or(AppError::NotFound("Food"))?;

    tracing::info!(food_id = %food.id, "food updated");
    Ok(ApiResponse::success("Food updated", food, Some(Meta::empty())))
}

pub async fn delete_food(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if !state.catalog.delete_food(id).await? {
        return Err(AppError::NotFound("Food"));
    }

    tracing::info!(food_id = %id, "food deleted");
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}
