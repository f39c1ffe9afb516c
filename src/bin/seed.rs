use chrono::Utc;
use food_ordering_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    models::{Food, Restaurant, Role, User},
    services::auth_service::hash_password,
    store::{CatalogStore, OrmStore, UserStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

type Menu = (&'static str, &'static str, &'static str, &'static [(&'static str, i64, &'static str)]);

const MENUS: &[Menu] = &[
    (
        "The Golden Dragon",
        "Authentic Szechuan and Cantonese delicacies in a premium setting.",
        "Market Street, Downtown",
        &[
            ("Spring Rolls", 250, "Appetizers"),
            ("Kung Pao Chicken", 450, "Main Course"),
            ("Dim Sum Platter", 600, "Appetizers"),
            ("Fried Rice", 350, "Sides"),
            ("Fortune Cookies", 150, "Desserts"),
        ],
    ),
    (
        "Mama Mia Pizzeria",
        "Wood-fired artisanal pizzas and handmade pasta since 1995.",
        "Little Italy Blvd, West Side",
        &[
            ("Margherita Pizza", 550, "Pizza"),
            ("Pepperoni Feast", 650, "Pizza"),
            ("Pasta Carbonara", 480, "Pasta"),
            ("Garlic Bread", 200, "Sides"),
            ("Tiramisu", 350, "Desserts"),
        ],
    ),
    (
        "Burger Empire",
        "Gourmet wagyu burgers and specialty milkshakes.",
        "Food Court, Central Mall",
        &[
            ("Classic Cheeseburger", 350, "Burgers"),
            ("Double Bacon King", 550, "Burgers"),
            ("Loaded Truffle Fries", 250, "Sides"),
            ("Vanilla Milkshake", 220, "Beverages"),
            ("Chocolate Lava Cake", 300, "Desserts"),
        ],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let conn = create_orm_conn(&config.database_url).await?;
    run_migrations(&conn).await?;
    let store = OrmStore::new(conn);

    let admin_id = ensure_user(&store, "Admin", "admin@example.com", "admin123", Role::Admin).await?;
    let user_id = ensure_user(&store, "Demo User", "user@example.com", "user123", Role::User).await?;
    seed_catalog(&store).await?;

    tracing::info!(%admin_id, %user_id, "seed completed");
    Ok(())
}

async fn ensure_user(
    store: &OrmStore,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = store.find_user_by_email(email).await? {
        tracing::info!(email, "user already present");
        return Ok(existing.id);
    }

    let user = User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password)?,
        role,
        created_at: Utc::now(),
    };
    let user = store.insert_user(user).await?;
    tracing::info!(email, role = role.as_str(), "user created");
    Ok(user.id)
}

/// Restaurants are matched by name so re-running the seed adds nothing twice.
async fn seed_catalog(store: &OrmStore) -> anyhow::Result<()> {
    let existing = store.list_restaurants(true).await?;

    for (name, description, address, foods) in MENUS {
        if existing.iter().any(|r| r.name == *name) {
            tracing::info!(restaurant = name, "restaurant already present");
            continue;
        }

        let restaurant = store
            .insert_restaurant(Restaurant {
                id: Uuid::new_v4(),
                name: name.to_string(),
                image: None,
                description: Some(description.to_string()),
                address: Some(address.to_string()),
                is_active: true,
                created_at: Utc::now(),
            })
            .await?;

        for (food_name, price, category) in foods.iter() {
            store
                .insert_food(Food {
                    id: Uuid::new_v4(),
                    restaurant_id: restaurant.id,
                    name: food_name.to_string(),
                    image: None,
                    price: Some(*price),
                    category: Some(category.to_string()),
                    is_available: true,
                    created_at: Utc::now(),
                })
                .await?;
        }
        tracing::info!(restaurant = name, foods = foods.len(), "restaurant seeded");
    }

    Ok(())
}
