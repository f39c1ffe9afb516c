use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Cart, Food, Order, OrderStatus, Restaurant, User},
};

use super::{CartStore, CatalogStore, OrderStore, UserStore};

/// In-process store backed by mutex-guarded maps.
///
/// `place_order` takes the cart lock before the order lock; no other method
/// holds both.
#[derive(Debug, Default)]
pub struct MemoryStore {
    restaurants: Mutex<HashMap<Uuid, Restaurant>>,
    foods: Mutex<HashMap<Uuid, Food>>,
    carts: Mutex<HashMap<Uuid, Cart>>,
    orders: Mutex<HashMap<Uuid, Order>>,
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    orders
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_food_by_id(&self, id: Uuid) -> AppResult<Option<Food>> {
        Ok(self.foods.lock().await.get(&id).cloned())
    }

    async fn list_foods_by_restaurant(&self, restaurant_id: Uuid) -> AppResult<Vec<Food>> {
        let mut foods: Vec<Food> = self
            .foods
            .lock()
            .await
            .values()
            .filter(|food| food.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        foods.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(foods)
    }

    async fn insert_food(&self, food: Food) -> AppResult<Food> {
        self.foods.lock().await.insert(food.id, food.clone());
        Ok(food)
    }

    async fn update_food(&self, food: Food) -> AppResult<Option<Food>> {
        let mut foods = self.foods.lock().await;
        match foods.get_mut(&food.id) {
            Some(slot) => {
                *slot = food.clone();
                Ok(Some(food))
            }
            None => Ok(None),
        }
    }

    async fn delete_food(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.foods.lock().await.remove(&id).is_some())
    }

    async fn list_restaurants(&self, include_inactive: bool) -> AppResult<Vec<Restaurant>> {
        let mut restaurants: Vec<Restaurant> = self
            .restaurants
            .lock()
            .await
            .values()
            .filter(|r| include_inactive || r.is_active)
            .cloned()
            .collect();
        restaurants.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(restaurants)
    }

    async fn find_restaurant_by_id(&self, id: Uuid) -> AppResult<Option<Restaurant>> {
        Ok(self.restaurants.lock().await.get(&id).cloned())
    }

    async fn insert_restaurant(&self, restaurant: Restaurant) -> AppResult<Restaurant> {
        self.restaurants
            .lock()
            .await
            .insert(restaurant.id, restaurant.clone());
        Ok(restaurant)
    }

    async fn update_restaurant(&self, restaurant: Restaurant) -> AppResult<Option<Restaurant>> {
        let mut restaurants = self.restaurants.lock().await;
        match restaurants.get_mut(&restaurant.id) {
            Some(slot) => {
                *slot = restaurant.clone();
                Ok(Some(restaurant))
            }
            None => Ok(None),
        }
    }

    async fn delete_restaurant(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.restaurants.lock().await.remove(&id).is_some())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn load_cart(&self, owner: Uuid) -> AppResult<Option<Cart>> {
        Ok(self.carts.lock().await.get(&owner).cloned())
    }

    async fn save_cart(&self, cart: &Cart) -> AppResult<()> {
        self.carts.lock().await.insert(cart.owner, cart.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn place_order(&self, order: &Order) -> AppResult<()> {
        let mut carts = self.carts.lock().await;
        let mut orders = self.orders.lock().await;
        orders.insert(order.id, order.clone());
        carts.remove(&order.owner);
        Ok(())
    }

    async fn find_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.orders.lock().await.get(&id).cloned())
    }

    async fn list_orders_by_owner(&self, owner: Uuid) -> AppResult<Vec<Order>> {
        let orders = self
            .orders
            .lock()
            .await
            .values()
            .filter(|order| order.owner == owner)
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    async fn list_all_orders(&self) -> AppResult<Vec<Order>> {
        let orders = self.orders.lock().await.values().cloned().collect();
        Ok(newest_first(orders))
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Order>> {
        let mut orders = self.orders.lock().await;
        Ok(orders.get_mut(&id).map(|order| {
            order.status = status;
            order.updated_at = updated_at;
            order.clone()
        }))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: User) -> AppResult<User> {
        let mut users = self.users.lock().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(AppError::BadRequest("Email already exists".into()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}
