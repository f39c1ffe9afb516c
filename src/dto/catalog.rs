use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{Food, Restaurant};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RestaurantQuery {
    /// Include inactive restaurants.
    pub all: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFoodRequest {
    pub name: String,
    pub image: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFoodRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RestaurantList {
    #[schema(value_type = Vec<Restaurant>)]
    pub items: Vec<Restaurant>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FoodList {
    #[schema(value_type = Vec<Food>)]
    pub items: Vec<Food>,
}
