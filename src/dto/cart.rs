use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Cart, Food, QuantityDelta},
    services::pricing::ResolvedLine,
};

/// `quantity` is a signed adjustment: positive adds, negative takes away.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub food_id: Uuid,
    #[schema(value_type = i32)]
    pub quantity: QuantityDelta,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub food_id: Uuid,
    /// `None` when the food has been deleted from the catalog.
    pub food: Option<Food>,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total_amount: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CartView {
    /// Placeholder returned when the user has no cart yet.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_amount: 0,
            updated_at: None,
        }
    }

    pub fn from_resolved(cart: &Cart, lines: Vec<ResolvedLine>) -> Self {
        Self {
            items: lines
                .into_iter()
                .map(|line| CartLineView {
                    food_id: line.food_id,
                    food: line.food,
                    quantity: line.quantity,
                })
                .collect(),
            total_amount: cart.total_amount,
            updated_at: Some(cart.updated_at),
        }
    }
}
