use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Flat fee added to every order on top of the cart total.
pub const DELIVERY_FEE: i64 = 15;

/// Snapshot name used when an order line's food no longer exists.
pub const UNKNOWN_ITEM_NAME: &str = "Unknown Item";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::BadRequest(format!("Unknown role {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

/// Signed quantity adjustment applied to a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct QuantityDelta(pub i32);

impl QuantityDelta {
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub food_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub owner: Uuid,
    pub items: Vec<CartLine>,
    pub total_amount: i64,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn empty(owner: Uuid) -> Self {
        Self {
            owner,
            items: Vec::new(),
            total_amount: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn line(&self, food_id: Uuid) -> Option<&CartLine> {
        self.items.iter().find(|line| line.food_id == food_id)
    }

    /// Adds `delta` to the line for `food_id`. Lines that reach zero or
    /// below are dropped; a non-positive delta for a missing line is a no-op.
    pub fn apply_delta(&mut self, food_id: Uuid, delta: QuantityDelta) -> Result<(), AppError> {
        match self.items.iter().position(|line| line.food_id == food_id) {
            Some(index) => {
                let current = self.items[index].quantity;
                let next = current
                    .checked_add(delta.0)
                    .ok_or_else(|| AppError::BadRequest("quantity out of range".into()))?;
                if next <= 0 {
                    self.items.remove(index);
                } else {
                    self.items[index].quantity = next;
                }
            }
            None if delta.is_positive() => self.items.push(CartLine {
                food_id,
                quantity: delta.0,
            }),
            None => {}
        }
        Ok(())
    }

    /// Drops every line pointing at `food_id`, dangling or not.
    pub fn remove_line(&mut self, food_id: Uuid) {
        self.items.retain(|line| line.food_id != food_id);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid order status {s:?}")))
    }
}

/// Item captured at checkout. Never refreshed from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub food_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: i64,
    pub quantity: i32,
}

impl OrderLine {
    pub fn amount(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub owner: Uuid,
    pub items: Vec<OrderLine>,
    pub total_amount: i64,
    pub delivery_address: String,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_appends_merges_and_removes() {
        let food = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());

        cart.apply_delta(food, QuantityDelta(2)).unwrap();
        cart.apply_delta(food, QuantityDelta(3)).unwrap();
        assert_eq!(cart.items, vec![CartLine { food_id: food, quantity: 5 }]);

        cart.apply_delta(food, QuantityDelta(-6)).unwrap();
        assert!(cart.items.is_empty());
    }

    #[test]
    fn delta_landing_on_zero_removes_line() {
        let food = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());
        cart.apply_delta(food, QuantityDelta(4)).unwrap();
        cart.apply_delta(food, QuantityDelta(-4)).unwrap();
        assert!(cart.items.is_empty());
        assert!(cart.line(food).is_none());
    }

    #[test]
    fn non_positive_delta_on_missing_line_is_noop() {
        let mut cart = Cart::empty(Uuid::new_v4());
        cart.apply_delta(Uuid::new_v4(), QuantityDelta(0)).unwrap();
        cart.apply_delta(Uuid::new_v4(), QuantityDelta(-3)).unwrap();
        assert!(cart.items.is_empty());
    }

    #[test]
    fn overflowing_delta_is_rejected() {
        let food = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());
        cart.apply_delta(food, QuantityDelta(i32::MAX)).unwrap();
        let err = cart.apply_delta(food, QuantityDelta(1)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(cart.line(food).map(|l| l.quantity), Some(i32::MAX));
    }

    #[test]
    fn lines_keep_insertion_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut cart = Cart::empty(Uuid::new_v4());
        for id in [a, b, c] {
            cart.apply_delta(id, QuantityDelta(1)).unwrap();
        }
        cart.remove_line(b);
        let ids: Vec<Uuid> = cart.items.iter().map(|l| l.food_id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn status_labels_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("pending".parse::<OrderStatus>().is_err());
    }
}
