use sqlx::PgPool;
use std::sync::Arc;

use crate::executor::Executor;
use crate::repository::equipment::EquipmentRepositoryImpl;
use crate::repository::site::{RegionRepositoryImpl, SiteRepositoryImpl};

pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<PgPool> {
        &self.pool
    }

    /// Create all repositories sharing a single transaction
    pub async fn create_registry_repositories(&self) -> Result<RegistryRepositories, sqlx::Error> {
        let tx = self.pool.begin().await?;
        let executor = Executor::new(tx);

        Ok(RegistryRepositories {
            site_repository: Arc::new(SiteRepositoryImpl::new(executor.clone())),
            region_repository: Arc::new(RegionRepositoryImpl::new(executor.clone())),
            equipment_repository: Arc::new(EquipmentRepositoryImpl::new(executor.clone())),
            executor,
        })
    }
}

/// Repositories bound to one transaction. Dropping without `commit` rolls
/// the transaction back.
pub struct RegistryRepositories {
    pub executor: Executor,
    pub site_repository: Arc<SiteRepositoryImpl>,
    pub region_repository: Arc<RegionRepositoryImpl>,
    pub equipment_repository: Arc<EquipmentRepositoryImpl>,
}

impl RegistryRepositories {
    pub async fn commit(&self) -> Result<(), sqlx::Error> {
        self.executor.commit().await
    }

    pub async fn rollback(&self) -> Result<(), sqlx::Error> {
        self.executor.rollback().await
    }
}
