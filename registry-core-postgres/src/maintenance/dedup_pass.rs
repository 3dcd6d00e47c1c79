use chrono::{DateTime, Utc};
use registry_core_db::scope::{deduplicate, DedupGroup, DedupPlan};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use super::{group_label, MaintenanceError};
use crate::catalog_cache::CatalogCache;
use crate::postgres_repositories::PostgresRepositories;
use crate::repository::equipment::EquipmentRepositoryImpl;
use crate::utils::is_retryable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupRunReport {
    pub run_id: Uuid,
    pub dry_run: bool,
    pub cancelled: bool,
    pub groups_processed: usize,
    pub kept: usize,
    pub dropped: usize,
    pub dropped_ids: Vec<i64>,
    pub duplicate_groups: Vec<DedupGroup>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DedupRunReport {
    fn new(run_id: Uuid, dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            dry_run,
            cancelled: false,
            groups_processed: 0,
            kept: 0,
            dropped: 0,
            dropped_ids: Vec::new(),
            duplicate_groups: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    fn record(&mut self, plan: DedupPlan) {
        self.groups_processed += 1;
        self.kept += plan.kept_count();
        self.dropped += plan.dropped_count();
        self.dropped_ids.extend(plan.dropped_ids());
        self.duplicate_groups.extend(plan.groups);
    }
}

/// # Documentation
/// - Removes duplicate equipment one site group per transaction
/// - Each group is locked with `SELECT ... FOR UPDATE` under `SERIALIZABLE`; a
///   serialization failure or deadlock retries the whole group, so a group is
///   never partially deleted
/// - The cancellation flag is only checked between groups
pub struct DedupPass {
    pool: Arc<PgPool>,
    max_retries: u32,
    dry_run: bool,
    cancel: Arc<AtomicBool>,
}

impl DedupPass {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            max_retries: 3,
            dry_run: false,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Setting the flag stops the pass before the next site group.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub async fn run(&self, catalog: &CatalogCache) -> Result<DedupRunReport, MaintenanceError> {
        self.check_catalog(catalog).await?;

        let run_id = Uuid::new_v4();
        let mut report = DedupRunReport::new(run_id, self.dry_run);

        let groups = {
            let mut conn = self.pool.acquire().await?;
            EquipmentRepositoryImpl::duplicate_candidate_groups_impl(&mut conn).await?
        };
        tracing::info!(%run_id, candidates = groups.len(), dry_run = self.dry_run, "deduplication started");

        for site_id in groups {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::warn!(%run_id, processed = report.groups_processed, "deduplication cancelled");
                report.cancelled = true;
                break;
            }
            let plan = self.process_group_with_retry(site_id, run_id).await?;
            report.record(plan);
        }

        report.finished_at = Utc::now();
        tracing::info!(
            %run_id,
            groups = report.groups_processed,
            kept = report.kept,
            dropped = report.dropped,
            "deduplication finished"
        );
        Ok(report)
    }

    async fn check_catalog(&self, catalog: &CatalogCache) -> Result<(), MaintenanceError> {
        let repos = PostgresRepositories::new(self.pool.clone())
            .create_registry_repositories()
            .await?;
        let refreshed = catalog
            .refresh(&*repos.site_repository, &*repos.region_repository)
            .await;
        repos.rollback().await?;
        if let Err(error) = refreshed {
            tracing::error!(%error, "site catalog is inconsistent, deduplication refused");
            return Err(error.into());
        }
        Ok(())
    }

    async fn process_group_with_retry(
        &self,
        site_id: Option<i64>,
        run_id: Uuid,
    ) -> Result<DedupPlan, MaintenanceError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.process_group(site_id, run_id).await {
                Ok(plan) => return Ok(plan),
                Err(error) if is_retryable(error.as_ref()) => {
                    if attempts > self.max_retries {
                        tracing::error!(group = %group_label(site_id), attempts, "giving up on site group");
                        return Err(MaintenanceError::RetriesExhausted {
                            group: group_label(site_id),
                            attempts,
                        });
                    }
                    tracing::warn!(group = %group_label(site_id), attempts, %error, "conflict, retrying site group");
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    async fn process_group(
        &self,
        site_id: Option<i64>,
        run_id: Uuid,
    ) -> Result<DedupPlan, Box<dyn Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let records = EquipmentRepositoryImpl::lock_group_impl(&mut tx, site_id).await?;
        let plan = deduplicate(records);

        if plan.is_noop() || self.dry_run {
            tx.rollback().await?;
            return Ok(plan);
        }

        let deleted =
            EquipmentRepositoryImpl::delete_batch_impl(&mut tx, &plan.dropped_ids(), Some(run_id)).await?;
        tx.commit().await?;

        tracing::info!(
            group = %group_label(site_id),
            kept = plan.kept_count(),
            dropped = deleted,
            "site group deduplicated"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::equipment::equipment_repository::test_utils::test_utils::{
        create_test_equipment, setup_site,
    };
    use crate::test_helper::setup_shared_repos;
    use registry_core_db::repository::create_batch::CreateBatch;
    use registry_core_db::repository::load_batch::LoadBatch;
    use serial_test::serial;
    use sqlx::{Postgres, Transaction};
    use std::time::Duration;

    /// Row-locks a site group from another session until the returned
    /// transaction ends.
    async fn hold_group(
        shared: &PostgresRepositories,
        site_id: i64,
    ) -> Result<Transaction<'static, Postgres>, Box<dyn Error + Send + Sync>> {
        let mut blocker = shared.pool().begin().await?;
        sqlx::query("SELECT id FROM equipment WHERE site_id = $1 FOR UPDATE")
            .bind(site_id)
            .fetch_all(&mut *blocker)
            .await?;
        Ok(blocker)
    }

    /// Rewrites the group's rows so a transaction that read them earlier can
    /// no longer serialize.
    async fn touch_group_and_commit(
        mut blocker: Transaction<'static, Postgres>,
        site_id: i64,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        sqlx::query("UPDATE equipment SET status = status WHERE site_id = $1")
            .bind(site_id)
            .execute(&mut *blocker)
            .await?;
        blocker.commit().await?;
        Ok(())
    }

    async fn seed_duplicates(
        shared: &PostgresRepositories,
        code: &str,
    ) -> Result<(i64, Vec<i64>), Box<dyn Error + Send + Sync>> {
        let repos = shared.create_registry_repositories().await?;
        let site_id = setup_site(&repos, code).await?;
        let saved = repos
            .equipment_repository
            .create_batch(
                vec![
                    create_test_equipment(Some("DUP-1"), Some(site_id), None),
                    create_test_equipment(Some("dup-1 "), Some(site_id), None),
                    create_test_equipment(None, Some(site_id), None),
                ],
                None,
            )
            .await?;
        repos.commit().await?;
        Ok((site_id, saved.iter().map(|e| e.id).collect()))
    }

    async fn cleanup(shared: &PostgresRepositories, site_id: i64) -> Result<(), Box<dyn Error + Send + Sync>> {
        let pool = shared.pool();
        let region_id: Option<i64> = sqlx::query_scalar("SELECT region_id FROM site WHERE id = $1")
            .bind(site_id)
            .fetch_one(&**pool)
            .await?;
        sqlx::query("DELETE FROM equipment WHERE site_id = $1")
            .bind(site_id)
            .execute(&**pool)
            .await?;
        sqlx::query("DELETE FROM site WHERE id = $1")
            .bind(site_id)
            .execute(&**pool)
            .await?;
        sqlx::query("DELETE FROM region WHERE id = $1")
            .bind(region_id)
            .execute(&**pool)
            .await?;
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_dedup_pass_drops_later_imports() -> Result<(), Box<dyn Error + Send + Sync>> {
        let shared = setup_shared_repos().await?;
        let (site_id, ids) = seed_duplicates(&shared, "XDA").await?;

        let pass = DedupPass::new(shared.pool().clone());
        let report = pass.run(&CatalogCache::default()).await?;
        assert!(report.dropped_ids.contains(&ids[1]));
        assert!(!report.dropped_ids.contains(&ids[0]));
        assert!(!report.dropped_ids.contains(&ids[2]));

        let repos = shared.create_registry_repositories().await?;
        let loaded = repos.equipment_repository.load_batch(&ids).await?;
        assert!(loaded[0].is_some());
        assert!(loaded[1].is_none());
        assert!(loaded[2].is_some());
        repos.rollback().await?;

        cleanup(&shared, site_id).await
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_dry_run_deletes_nothing() -> Result<(), Box<dyn Error + Send + Sync>> {
        let shared = setup_shared_repos().await?;
        let (site_id, ids) = seed_duplicates(&shared, "XDB").await?;

        let report = DedupPass::new(shared.pool().clone())
            .dry_run(true)
            .run(&CatalogCache::default())
            .await?;
        assert!(report.dry_run);
        assert!(report.dropped_ids.contains(&ids[1]));

        let repos = shared.create_registry_repositories().await?;
        let loaded = repos.equipment_repository.load_batch(&ids).await?;
        assert!(loaded.iter().all(Option::is_some));
        repos.rollback().await?;

        cleanup(&shared, site_id).await
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_cancelled_before_first_group() -> Result<(), Box<dyn Error + Send + Sync>> {
        let shared = setup_shared_repos().await?;
        let (site_id, ids) = seed_duplicates(&shared, "XDC").await?;

        let pass = DedupPass::new(shared.pool().clone());
        pass.cancel_flag().store(true, Ordering::SeqCst);
        let report = pass.run(&CatalogCache::default()).await?;
        assert!(report.cancelled);
        assert_eq!(report.groups_processed, 0);

        let repos = shared.create_registry_repositories().await?;
        let loaded = repos.equipment_repository.load_batch(&ids).await?;
        assert!(loaded.iter().all(Option::is_some));
        repos.rollback().await?;

        cleanup(&shared, site_id).await
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_conflicting_group_is_retried_then_committed() -> Result<(), Box<dyn Error + Send + Sync>> {
        let shared = setup_shared_repos().await?;
        let (site_id, ids) = seed_duplicates(&shared, "XDD").await?;

        let blocker = hold_group(&shared, site_id).await?;
        let pass = DedupPass::new(shared.pool().clone()).with_max_retries(3);
        let handle = tokio::spawn(async move { pass.run(&CatalogCache::default()).await });

        tokio::time::sleep(Duration::from_millis(500)).await;
        touch_group_and_commit(blocker, site_id).await?;

        let report = handle.await??;
        assert!(report.dropped_ids.contains(&ids[1]));
        assert!(!report.dropped_ids.contains(&ids[0]));

        let repos = shared.create_registry_repositories().await?;
        let loaded = repos.equipment_repository.load_batch(&ids).await?;
        assert!(loaded[0].is_some());
        assert!(loaded[1].is_none());
        assert!(loaded[2].is_some());
        repos.rollback().await?;

        cleanup(&shared, site_id).await
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_exhausted_retries_delete_nothing() -> Result<(), Box<dyn Error + Send + Sync>> {
        let shared = setup_shared_repos().await?;
        let (site_id, ids) = seed_duplicates(&shared, "XDE").await?;

        let blocker = hold_group(&shared, site_id).await?;
        let pass = DedupPass::new(shared.pool().clone()).with_max_retries(0);
        let handle = tokio::spawn(async move { pass.run(&CatalogCache::default()).await });

        tokio::time::sleep(Duration::from_millis(500)).await;
        touch_group_and_commit(blocker, site_id).await?;

        let result = handle.await?;
        assert!(matches!(
            result,
            Err(MaintenanceError::RetriesExhausted { attempts: 1, .. })
        ));

        let repos = shared.create_registry_repositories().await?;
        let loaded = repos.equipment_repository.load_batch(&ids).await?;
        assert!(loaded.iter().all(Option::is_some));
        repos.rollback().await?;

        cleanup(&shared, site_id).await
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_cancelled_between_groups() -> Result<(), Box<dyn Error + Send + Sync>> {
        let shared = setup_shared_repos().await?;
        let (first_site, first_ids) = seed_duplicates(&shared, "XDF").await?;
        let (second_site, second_ids) = seed_duplicates(&shared, "XDG").await?;
        let ((low_site, low_ids), (high_site, high_ids)) = if first_site < second_site {
            ((first_site, first_ids), (second_site, second_ids))
        } else {
            ((second_site, second_ids), (first_site, first_ids))
        };

        // groups run in ascending site id order: hold the first one while cancelling
        let blocker = hold_group(&shared, low_site).await?;
        let pass = DedupPass::new(shared.pool().clone());
        let cancel = pass.cancel_flag();
        let handle = tokio::spawn(async move { pass.run(&CatalogCache::default()).await });

        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.store(true, Ordering::SeqCst);
        blocker.rollback().await?;

        let report = handle.await??;
        assert!(report.cancelled);
        assert_eq!(report.groups_processed, 1);
        assert_eq!(report.dropped_ids, vec![low_ids[1]]);

        let repos = shared.create_registry_repositories().await?;
        let low = repos.equipment_repository.load_batch(&low_ids).await?;
        assert!(low[1].is_none());
        let high = repos.equipment_repository.load_batch(&high_ids).await?;
        assert!(high.iter().all(Option::is_some));
        repos.rollback().await?;

        cleanup(&shared, low_site).await?;
        cleanup(&shared, high_site).await
    }
}
