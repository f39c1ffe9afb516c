use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, UserSummary},
        cart::{AddToCartRequest, CartLineView, CartView},
        catalog::{
            CreateFoodRequest, CreateRestaurantRequest, FoodList, RestaurantList,
            UpdateFoodRequest, UpdateRestaurantRequest,
        },
        orders::{OrderLineView, OrderList, OrderView, PlaceOrderRequest, UpdateOrderStatusRequest},
    },
    models::{Food, OrderLine, OrderStatus, Restaurant, Role, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, foods, health, orders, restaurants},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        restaurants::list_restaurants,
        restaurants::get_restaurant,
        restaurants::create_restaurant,
        restaurants::update_restaurant,
        restaurants::delete_restaurant,
        foods::list_foods,
        foods::create_food,
        foods::update_food,
        foods::delete_food,
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        orders::place_order,
        orders::list_user_orders,
        orders::list_all_orders,
        orders::update_order_status
    ),
    components(
        schemas(
            Role,
            User,
            Restaurant,
            Food,
            OrderLine,
            OrderStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UserSummary,
            CreateRestaurantRequest,
            UpdateRestaurantRequest,
            CreateFoodRequest,
            UpdateFoodRequest,
            RestaurantList,
            FoodList,
            AddToCartRequest,
            CartLineView,
            CartView,
            PlaceOrderRequest,
            UpdateOrderStatusRequest,
            OrderLineView,
            OrderView,
            OrderList,
            health::HealthData,
            Meta,
            ApiResponse<User>,
            ApiResponse<LoginResponse>,
            ApiResponse<CartView>,
            ApiResponse<OrderView>,
            ApiResponse<OrderList>,
            ApiResponse<Restaurant>,
            ApiResponse<Food>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Restaurants", description = "Restaurant catalog"),
        (name = "Foods", description = "Menu items"),
        (name = "Cart", description = "Per-user cart"),
        (name = "Orders", description = "Checkout and order lifecycle"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
