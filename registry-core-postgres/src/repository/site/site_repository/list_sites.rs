use async_trait::async_trait;
use registry_core_db::models::SiteModel;
use registry_core_db::repository::list_sites::ListSites;
use sqlx::{PgConnection, Postgres};
use std::error::Error;

use super::repo_impl::SiteRepositoryImpl;
use crate::utils::TryFromRow;

impl SiteRepositoryImpl {
    pub(crate) async fn list_sites_impl(
        conn: &mut PgConnection,
    ) -> Result<Vec<SiteModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query("SELECT id, name, local_code, icao_code, region_id FROM site ORDER BY id")
            .fetch_all(&mut *conn)
            .await?;

        let mut sites = Vec::with_capacity(rows.len());
        for row in rows {
            sites.push(SiteModel::try_from_row(&row)?);
        }
        Ok(sites)
    }
}

#[async_trait]
impl ListSites<Postgres> for SiteRepositoryImpl {
    async fn list_sites(&self) -> Result<Vec<SiteModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        Self::list_sites_impl(&mut **transaction).await
    }
}
