use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::AuthSettings,
    services::locks::OwnerLocks,
    store::{CartStore, CatalogStore, MemoryStore, OrderStore, OrmStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
    pub users: Arc<dyn UserStore>,
    pub cart_locks: Arc<OwnerLocks>,
    pub auth: AuthSettings,
}

impl AppState {
    /// Wires every store seam to the same backing store.
    pub fn new<S>(store: Arc<S>, auth: AuthSettings) -> Self
    where
        S: CatalogStore + CartStore + OrderStore + UserStore + 'static,
    {
        Self {
            catalog: store.clone(),
            carts: store.clone(),
            orders: store.clone(),
            users: store,
            cart_locks: Arc::new(OwnerLocks::new()),
            auth,
        }
    }

    pub fn with_orm(conn: DatabaseConnection, auth: AuthSettings) -> Self {
        Self::new(Arc::new(OrmStore::new(conn)), auth)
    }

    pub fn in_memory(auth: AuthSettings) -> Self {
        Self::new(Arc::new(MemoryStore::new()), auth)
    }
}
