use registry_core_db::repository::{FindBySiteId, UpdateResolvedSite};
use registry_core_db::resolver::re_resolve;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::MaintenanceError;
use crate::catalog_cache::CatalogCache;
use crate::postgres_repositories::PostgresRepositories;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReResolveReport {
    pub run_id: Uuid,
    pub dry_run: bool,
    pub examined: usize,
    /// `(equipment id, site id)` pairs found unambiguously.
    pub assignments: Vec<(i64, i64)>,
    pub applied: usize,
    pub needs_review: Vec<i64>,
}

/// Backfills the site of equipment imported before its free-text reference
/// could be resolved. Runs in one transaction.
pub struct ReResolvePass {
    pool: Arc<PgPool>,
    dry_run: bool,
}

impl ReResolvePass {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self, catalog: &CatalogCache) -> Result<ReResolveReport, MaintenanceError> {
        let repos = PostgresRepositories::new(self.pool.clone())
            .create_registry_repositories()
            .await?;

        let snapshot = match catalog
            .refresh(&*repos.site_repository, &*repos.region_repository)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::error!(%error, "site catalog is inconsistent, re-resolution refused");
                return Err(error.into());
            }
        };

        let unresolved = repos.equipment_repository.find_unresolved().await?;
        let backfill = re_resolve(&unresolved, &snapshot);

        let applied = if self.dry_run {
            repos.rollback().await?;
            0
        } else {
            let applied = repos
                .equipment_repository
                .update_resolved_site(&backfill.assignments)
                .await?;
            repos.commit().await?;
            applied
        };

        let report = ReResolveReport {
            run_id: Uuid::new_v4(),
            dry_run: self.dry_run,
            examined: unresolved.len(),
            assignments: backfill.assignments,
            applied,
            needs_review: backfill.needs_review,
        };
        tracing::info!(
            run_id = %report.run_id,
            examined = report.examined,
            applied = report.applied,
            needs_review = report.needs_review.len(),
            "re-resolution finished"
        );
        Ok(report)
    }
}
