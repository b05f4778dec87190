use std::sync::Arc;

use crate::application::catalog_service::CatalogService;
use crate::application::order_service::OrderService;
use crate::db::DbPool;
use crate::domain::ports::{DynCatalogRepository, DynOrderRepository};
use crate::infrastructure::catalog_repo::DieselCatalogRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::user_directory::UserDirectoryClient;

pub type DynCatalogService = CatalogService<DynCatalogRepository>;
pub type DynOrderService = OrderService<DynOrderRepository, DynCatalogRepository>;

/// Shared handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<DynCatalogService>,
    pub orders: Arc<DynOrderService>,
    pub directory: UserDirectoryClient,
}

impl AppState {
    pub fn new(
        catalog_repo: DynCatalogRepository,
        order_repo: DynOrderRepository,
        directory: UserDirectoryClient,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(Arc::clone(&catalog_repo))),
            orders: Arc::new(OrderService::new(order_repo, catalog_repo)),
            directory,
        }
    }

    /// Wire the diesel repositories onto one connection pool.
    pub fn with_pool(pool: DbPool, directory: UserDirectoryClient) -> Self {
        Self::new(
            Arc::new(DieselCatalogRepository::new(pool.clone())),
            Arc::new(DieselOrderRepository::new(pool)),
            directory,
        )
    }
}
