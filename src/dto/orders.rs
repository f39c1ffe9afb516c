use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Food, Order, OrderStatus};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub payment_method: String,
}

/// Status arrives as a raw label so unknown values get a 400 from the
/// service rather than a deserialization error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub food_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: i64,
    pub quantity: i32,
    /// Current catalog entry, for display only.
    pub food: Option<Food>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub owner: Uuid,
    pub items: Vec<OrderLineView>,
    pub total_amount: i64,
    pub delivery_address: String,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderView {
    pub fn new(order: Order, foods: Vec<Option<Food>>) -> Self {
        let items = order
            .items
            .into_iter()
            .zip(foods)
            .map(|(line, food)| OrderLineView {
                food_id: line.food_id,
                name: line.name,
                image: line.image,
                price: line.price,
                quantity: line.quantity,
                food,
            })
            .collect();
        Self {
            id: order.id,
            owner: order.owner,
            items,
            total_amount: order.total_amount,
            delivery_address: order.delivery_address,
            payment_method: order.payment_method,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<OrderView>)]
    pub items: Vec<OrderView>,
}
