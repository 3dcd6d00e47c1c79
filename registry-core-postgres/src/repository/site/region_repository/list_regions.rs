use async_trait::async_trait;
use registry_core_db::models::RegionModel;
use registry_core_db::repository::list_regions::ListRegions;
use sqlx::{PgConnection, Postgres};
use std::error::Error;

use super::repo_impl::RegionRepositoryImpl;
use crate::utils::TryFromRow;

impl RegionRepositoryImpl {
    pub(crate) async fn list_regions_impl(
        conn: &mut PgConnection,
    ) -> Result<Vec<RegionModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query("SELECT id, code, name FROM region ORDER BY id")
            .fetch_all(&mut *conn)
            .await?;

        let mut regions = Vec::with_capacity(rows.len());
        for row in rows {
            regions.push(RegionModel::try_from_row(&row)?);
        }
        Ok(regions)
    }
}

#[async_trait]
impl ListRegions<Postgres> for RegionRepositoryImpl {
    async fn list_regions(&self) -> Result<Vec<RegionModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        Self::list_regions_impl(&mut **transaction).await
    }
}
