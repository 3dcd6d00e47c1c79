use async_trait::async_trait;
use registry_core_db::repository::update_resolved_site::UpdateResolvedSite;
use sqlx::{PgConnection, Postgres};
use std::error::Error;

use super::repo_impl::EquipmentRepositoryImpl;

impl EquipmentRepositoryImpl {
    pub(crate) async fn update_resolved_site_impl(
        conn: &mut PgConnection,
        assignments: &[(i64, i64)],
    ) -> Result<usize, Box<dyn Error + Send + Sync>> {
        let mut updated = 0;
        for (equipment_id, site_id) in assignments {
            let result = sqlx::query("UPDATE equipment SET site_id = $2 WHERE id = $1 AND site_id IS NULL")
                .bind(equipment_id)
                .bind(site_id)
                .execute(&mut *conn)
                .await?;
            updated += result.rows_affected() as usize;
        }
        Ok(updated)
    }
}

#[async_trait]
impl UpdateResolvedSite<Postgres> for EquipmentRepositoryImpl {
    async fn update_resolved_site(
        &self,
        assignments: &[(i64, i64)],
    ) -> Result<usize, Box<dyn Error + Send + Sync>> {
        if assignments.is_empty() {
            return Ok(0);
        }
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        Self::update_resolved_site_impl(&mut **transaction, assignments).await
    }
}
