//! Persistence seams.
//!
//! Services only talk to these traits. [`orm::OrmStore`] backs them with
//! PostgreSQL through SeaORM; [`memory::MemoryStore`] keeps everything in
//! process and is what the test-suite runs against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Cart, Food, Order, OrderStatus, Restaurant, User},
};

pub mod memory;
pub mod orm;

pub use memory::MemoryStore;
pub use orm::OrmStore;

/// Restaurant and food records. Shared and read-only from the cart/order side.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_food_by_id(&self, id: Uuid) -> AppResult<Option<Food>>;

    async fn list_foods_by_restaurant(&self, restaurant_id: Uuid) -> AppResult<Vec<Food>>;

    async fn insert_food(&self, food: Food) -> AppResult<Food>;

    /// Replaces a stored food. `None` when no food has that id.
    async fn update_food(&self, food: Food) -> AppResult<Option<Food>>;

    async fn delete_food(&self, id: Uuid) -> AppResult<bool>;

    async fn list_restaurants(&self, include_inactive: bool) -> AppResult<Vec<Restaurant>>;

    async fn find_restaurant_by_id(&self, id: Uuid) -> AppResult<Option<Restaurant>>;

    async fn insert_restaurant(&self, restaurant: Restaurant) -> AppResult<Restaurant>;

    async fn update_restaurant(&self, restaurant: Restaurant) -> AppResult<Option<Restaurant>>;

    async fn delete_restaurant(&self, id: Uuid) -> AppResult<bool>;
}

/// One cart per owner, replaced wholesale on every save.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn load_cart(&self, owner: Uuid) -> AppResult<Option<Cart>>;

    async fn save_cart(&self, cart: &Cart) -> AppResult<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists `order` and deletes its owner's cart as one unit. Either both
    /// happen or neither does.
    async fn place_order(&self, order: &Order) -> AppResult<()>;

    async fn find_order(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// Newest first.
    async fn list_orders_by_owner(&self, owner: Uuid) -> AppResult<Vec<Order>>;

    /// Newest first.
    async fn list_all_orders(&self) -> AppResult<Vec<Order>>;

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Order>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn insert_user(&self, user: User) -> AppResult<User>;
}
