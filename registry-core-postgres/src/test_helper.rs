//! Test helper module for transaction-based test isolation
//!
//! Repositories in a [`TestContext`] share one transaction that is rolled
//! back when the context is dropped, so tests need no cleanup.

use crate::config::RegistryConfig;
use crate::postgres_repositories::{PostgresRepositories, RegistryRepositories};
use sqlx::postgres::PgPool;
use std::sync::Arc;

pub struct TestContext {
    pool: Arc<PgPool>,
    registry_repos: RegistryRepositories,
}

impl TestContext {
    pub fn registry_repos(&self) -> &RegistryRepositories {
        &self.registry_repos
    }

    pub fn pool(&self) -> &Arc<PgPool> {
        &self.pool
    }
}

async fn connect(max_connections: u32) -> Result<Arc<PgPool>, Box<dyn std::error::Error + Send + Sync>> {
    let max_connections = max_connections.to_string();
    let config = RegistryConfig::try_parse_from(["registry-test", "--max-connections", max_connections.as_str()])?;
    let pool = config.connect().await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(Arc::new(pool))
}

/// Setup a test context with a transactional database session
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     let ctx = setup_test_context().await?;
///     let site_repo = &ctx.registry_repos().site_repository;
///
///     // All changes are rolled back when ctx is dropped
///     Ok(())
/// }
/// ```
pub async fn setup_test_context() -> Result<TestContext, Box<dyn std::error::Error + Send + Sync>> {
    let pool = connect(1).await?;
    let registry_repos = PostgresRepositories::new(pool.clone())
        .create_registry_repositories()
        .await?;
    Ok(TestContext {
        pool,
        registry_repos,
    })
}

/// Setup a shared PostgresRepositories for tests that need to commit data
/// and then observe it from another transaction, such as the maintenance
/// passes. Such tests clean up after themselves and run `#[serial]`.
pub async fn setup_shared_repos() -> Result<PostgresRepositories, Box<dyn std::error::Error + Send + Sync>> {
    let pool = connect(5).await?;
    Ok(PostgresRepositories::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::site::site_repository::test_utils::test_utils::{create_test_region, random_id};
    use registry_core_db::repository::create_batch::CreateBatch;
    use registry_core_db::repository::list_regions::ListRegions;

    #[tokio::test]
    #[ignore]
    async fn test_transaction_rollback() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let region_id = random_id();
        {
            let ctx = setup_test_context().await?;
            let repo = &ctx.registry_repos().region_repository;
            repo.create_batch(vec![create_test_region(region_id, "RBK", "FIR Rollback")], None)
                .await?;

            let regions = repo.list_regions().await?;
            assert!(regions.iter().any(|r| r.id == region_id));
        }

        {
            let ctx = setup_test_context().await?;
            let regions = ctx.registry_repos().region_repository.list_regions().await?;
            assert!(!regions.iter().any(|r| r.id == region_id));
        }

        Ok(())
    }
}
