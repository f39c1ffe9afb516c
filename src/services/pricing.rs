use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CartLine, Food},
    store::CatalogStore,
};

/// A cart line paired with whatever the catalog currently holds for it.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub food_id: Uuid,
    pub quantity: i32,
    pub food: Option<Food>,
}

impl ResolvedLine {
    pub fn amount(&self) -> i64 {
        line_amount(self.food.as_ref(), self.quantity)
    }
}

/// `price * quantity`, or zero when the food or its price is missing.
pub fn line_amount(food: Option<&Food>, quantity: i32) -> i64 {
    food.and_then(|food| food.price)
        .map(|price| price.saturating_mul(i64::from(quantity)))
        .unwrap_or(0)
}

pub fn subtotal(lines: &[ResolvedLine]) -> i64 {
    lines
        .iter()
        .fold(0_i64, |total, line| total.saturating_add(line.amount()))
}

/// Looks every line up in the catalog, one round trip per line. Dangling
/// references resolve to `food: None` instead of failing.
pub async fn resolve_lines(
    catalog: &dyn CatalogStore,
    items: &[CartLine],
) -> AppResult<Vec<ResolvedLine>> {
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let food = catalog.find_food_by_id(item.food_id).await?;
        if food.is_none() {
            tracing::debug!(food_id = %item.food_id, "cart line references a missing food");
        }
        resolved.push(ResolvedLine {
            food_id: item.food_id,
            quantity: item.quantity,
            food,
        });
    }
    Ok(resolved)
}

pub async fn resolve_total(catalog: &dyn CatalogStore, items: &[CartLine]) -> AppResult<i64> {
    let resolved = resolve_lines(catalog, items).await?;
    Ok(subtotal(&resolved))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::store::MemoryStore;

    fn food(price: Option<i64>) -> Food {
        Food {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            name: "Spring Rolls".into(),
            image: None,
            price,
            category: Some("Appetizers".into()),
            is_available: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_food_and_missing_price_count_as_zero() {
        let store = MemoryStore::new();
        let priced = store.insert_food(food(Some(250))).await.unwrap();
        let unpriced = store.insert_food(food(None)).await.unwrap();

        let items = vec![
            CartLine { food_id: priced.id, quantity: 2 },
            CartLine { food_id: unpriced.id, quantity: 5 },
            CartLine { food_id: Uuid::new_v4(), quantity: 3 },
        ];

        let resolved = resolve_lines(&store, &items).await.unwrap();
        assert_eq!(resolved.len(), 3);
        assert!(resolved[2].food.is_none());
        assert_eq!(resolve_total(&store, &items).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn empty_cart_totals_zero() {
        let store = MemoryStore::new();
        assert_eq!(resolve_total(&store, &[]).await.unwrap(), 0);
    }

    #[test]
    fn amounts_saturate() {
        let expensive = food(Some(i64::MAX));
        assert_eq!(line_amount(Some(&expensive), 2), i64::MAX);
    }
}
