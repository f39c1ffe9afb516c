use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    entity::{
        cart_items::{ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts},
        foods::{ActiveModel as FoodActive, Column as FoodCol, Entity as Foods, Model as FoodModel},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        restaurants::{
            ActiveModel as RestaurantActive, Column as RestaurantCol, Entity as Restaurants,
            Model as RestaurantModel,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    models::{Cart, CartLine, Food, Order, OrderLine, OrderStatus, Restaurant, User},
};

use super::{CartStore, CatalogStore, OrderStore, UserStore};

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct OrmStore {
    conn: DatabaseConnection,
}

impl OrmStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn with_items(&self, models: Vec<OrderModel>) -> AppResult<Vec<Order>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut lines: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for item in OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(ids))
            .order_by_asc(OrderItemCol::Position)
            .all(&self.conn)
            .await?
        {
            lines
                .entry(item.order_id)
                .or_default()
                .push(order_line_from_entity(item));
        }

        models
            .into_iter()
            .map(|model| {
                let items = lines.remove(&model.id).unwrap_or_default();
                order_from_entity(model, items)
            })
            .collect()
    }
}

#[async_trait]
impl CatalogStore for OrmStore {
    async fn find_food_by_id(&self, id: Uuid) -> AppResult<Option<Food>> {
        Ok(Foods::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(food_from_entity))
    }

    async fn list_foods_by_restaurant(&self, restaurant_id: Uuid) -> AppResult<Vec<Food>> {
        Ok(Foods::find()
            .filter(FoodCol::RestaurantId.eq(restaurant_id))
            .order_by_asc(FoodCol::CreatedAt)
            .order_by_asc(FoodCol::Name)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(food_from_entity)
            .collect())
    }

    async fn insert_food(&self, food: Food) -> AppResult<Food> {
        let model = food_to_active(food).insert(&self.conn).await?;
        Ok(food_from_entity(model))
    }

    async fn update_food(&self, food: Food) -> AppResult<Option<Food>> {
        match food_to_active(food).update(&self.conn).await {
            Ok(model) => Ok(Some(food_from_entity(model))),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_food(&self, id: Uuid) -> AppResult<bool> {
        let result = Foods::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_restaurants(&self, include_inactive: bool) -> AppResult<Vec<Restaurant>> {
        let mut finder = Restaurants::find();
        if !include_inactive {
            finder = finder.filter(RestaurantCol::IsActive.eq(true));
        }
        Ok(finder
            .order_by_asc(RestaurantCol::CreatedAt)
            .order_by_asc(RestaurantCol::Name)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(restaurant_from_entity)
            .collect())
    }

    async fn find_restaurant_by_id(&self, id: Uuid) -> AppResult<Option<Restaurant>> {
        Ok(Restaurants::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(restaurant_from_entity))
    }

    async fn insert_restaurant(&self, restaurant: Restaurant) -> AppResult<Restaurant> {
        let model = restaurant_to_active(restaurant).insert(&self.conn).await?;
        Ok(restaurant_from_entity(model))
    }

    async fn update_restaurant(&self, restaurant: Restaurant) -> AppResult<Option<Restaurant>> {
        match restaurant_to_active(restaurant).update(&self.conn).await {
            Ok(model) => Ok(Some(restaurant_from_entity(model))),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_restaurant(&self, id: Uuid) -> AppResult<bool> {
        let result = Restaurants::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl CartStore for OrmStore {
    async fn load_cart(&self, owner: Uuid) -> AppResult<Option<Cart>> {
        let Some(cart) = Carts::find_by_id(owner).one(&self.conn).await? else {
            return Ok(None);
        };

        let items = CartItems::find()
            .filter(CartItemCol::UserId.eq(owner))
            .order_by_asc(CartItemCol::Position)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|item| CartLine {
                food_id: item.food_id,
                quantity: item.quantity,
            })
            .collect();

        Ok(Some(Cart {
            owner: cart.user_id,
            items,
            total_amount: cart.total_amount,
            updated_at: cart.updated_at.with_timezone(&Utc),
        }))
    }

    async fn save_cart(&self, cart: &Cart) -> AppResult<()> {
        let txn = self.conn.begin().await?;

        let header = CartActive {
            user_id: Set(cart.owner),
            total_amount: Set(cart.total_amount),
            updated_at: Set(cart.updated_at.into()),
        };
        Carts::insert(header)
            .on_conflict(
                OnConflict::column(CartCol::UserId)
                    .update_columns([CartCol::TotalAmount, CartCol::UpdatedAt])
                    .to_owned(),
            )
            .exec(&txn)
            .await?;

        CartItems::delete_many()
            .filter(CartItemCol::UserId.eq(cart.owner))
            .exec(&txn)
            .await?;

        if !cart.items.is_empty() {
            let rows = cart
                .items
                .iter()
                .enumerate()
                .map(|(position, line)| CartItemActive {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(cart.owner),
                    food_id: Set(line.food_id),
                    quantity: Set(line.quantity),
                    position: Set(position as i32),
                });
            CartItems::insert_many(rows).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for OrmStore {
    async fn place_order(&self, order: &Order) -> AppResult<()> {
        let txn = self.conn.begin().await?;

        OrderActive {
            id: Set(order.id),
            user_id: Set(order.owner),
            total_amount: Set(order.total_amount),
            delivery_address: Set(order.delivery_address.clone()),
            payment_method: Set(order.payment_method.clone()),
            status: Set(order.status.as_str().to_string()),
            created_at: Set(order.created_at.into()),
            updated_at: Set(order.updated_at.into()),
        }
        .insert(&txn)
        .await?;

        if !order.items.is_empty() {
            let rows = order
                .items
                .iter()
                .enumerate()
                .map(|(position, line)| OrderItemActive {
                    id: Set(Uuid::new_v4()),
                    order_id: Set(order.id),
                    food_id: Set(line.food_id),
                    name: Set(line.name.clone()),
                    image: Set(line.image.clone()),
                    price: Set(line.price),
                    quantity: Set(line.quantity),
                    position: Set(position as i32),
                });
            OrderItems::insert_many(rows).exec(&txn).await?;
        }

        // clear cart
        CartItems::delete_many()
            .filter(CartItemCol::UserId.eq(order.owner))
            .exec(&txn)
            .await?;
        Carts::delete_by_id(order.owner).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    async fn find_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        let Some(model) = Orders::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };
        Ok(self.with_items(vec![model]).await?.pop())
    }

    async fn list_orders_by_owner(&self, owner: Uuid) -> AppResult<Vec<Order>> {
        let models = Orders::find()
            .filter(OrderCol::UserId.eq(owner))
            .order_by_desc(OrderCol::CreatedAt)
            .all(&self.conn)
            .await?;
        self.with_items(models).await
    }

    async fn list_all_orders(&self) -> AppResult<Vec<Order>> {
        let models = Orders::find()
            .order_by_desc(OrderCol::CreatedAt)
            .all(&self.conn)
            .await?;
        self.with_items(models).await
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Order>> {
        let Some(existing) = Orders::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: OrderActive = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(updated_at.into());
        let model = active.update(&self.conn).await?;

        Ok(self.with_items(vec![model]).await?.pop())
    }
}

#[async_trait]
impl UserStore for OrmStore {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Users::find()
            .filter(UserCol::Email.eq(email))
            .one(&self.conn)
            .await?
            .map(user_from_entity)
            .transpose()
    }

    async fn insert_user(&self, user: User) -> AppResult<User> {
        let exist = Users::find()
            .filter(UserCol::Email.eq(user.email.as_str()))
            .one(&self.conn)
            .await?;
        if exist.is_some() {
            return Err(AppError::BadRequest("Email already exists".into()));
        }

        let inserted = UserActive {
            id: Set(user.id),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role.as_str().to_string()),
            created_at: Set(user.created_at.into()),
        }
        .insert(&self.conn)
        .await;
        let model = match inserted {
            Ok(model) => model,
            // a concurrent registration won the race for this email
            Err(err) if is_unique_violation(&err) => {
                return Err(AppError::BadRequest("Email already exists".into()));
            }
            Err(err) => return Err(err.into()),
        };
        user_from_entity(model)
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn food_from_entity(model: FoodModel) -> Food {
    Food {
        id: model.id,
        restaurant_id: model.restaurant_id,
        name: model.name,
        image: model.image,
        price: model.price,
        category: model.category,
        is_available: model.is_available,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn food_to_active(food: Food) -> FoodActive {
    FoodActive {
        id: Set(food.id),
        restaurant_id: Set(food.restaurant_id),
        name: Set(food.name),
        image: Set(food.image),
        price: Set(food.price),
        category: Set(food.category),
        is_available: Set(food.is_available),
        created_at: Set(food.created_at.into()),
    }
}

fn restaurant_from_entity(model: RestaurantModel) -> Restaurant {
    Restaurant {
        id: model.id,
        name: model.name,
        image: model.image,
        description: model.description,
        address: model.address,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn restaurant_to_active(restaurant: Restaurant) -> RestaurantActive {
    RestaurantActive {
        id: Set(restaurant.id),
        name: Set(restaurant.name),
        image: Set(restaurant.image),
        description: Set(restaurant.description),
        address: Set(restaurant.address),
        is_active: Set(restaurant.is_active),
        created_at: Set(restaurant.created_at.into()),
    }
}

fn order_line_from_entity(model: OrderItemModel) -> OrderLine {
    OrderLine {
        food_id: model.food_id,
        name: model.name,
        image: model.image,
        price: model.price,
        quantity: model.quantity,
    }
}

fn order_from_entity(model: OrderModel, items: Vec<OrderLine>) -> AppResult<Order> {
    let status = model.status.parse::<OrderStatus>().map_err(|_| {
        AppError::Internal(anyhow::anyhow!(
            "order {} has unknown status {:?}",
            model.id,
            model.status
        ))
    })?;
    Ok(Order {
        id: model.id,
        owner: model.user_id,
        items,
        total_amount: model.total_amount,
        delivery_address: model.delivery_address,
        payment_method: model.payment_method,
        status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn user_from_entity(model: UserModel) -> AppResult<User> {
    let role = model.role.parse().map_err(|_| {
        AppError::Internal(anyhow::anyhow!(
            "user {} has unknown role {:?}",
            model.id,
            model.role
        ))
    })?;
    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unique_violations_map_to_duplicate_email() {
        assert!(!is_unique_violation(&DbErr::RecordNotUpdated));
        assert!(!is_unique_violation(&DbErr::Custom("boom".into())));
    }
}
