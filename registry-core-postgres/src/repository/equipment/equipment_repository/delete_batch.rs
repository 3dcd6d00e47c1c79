use async_trait::async_trait;
use registry_core_db::repository::delete_batch::DeleteBatch;
use sqlx::{PgConnection, Postgres};
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::EquipmentRepositoryImpl;

impl EquipmentRepositoryImpl {
    /// Deletes equipment, recording each removal in `equipment_removal_log`.
    pub(crate) async fn delete_batch_impl(
        conn: &mut PgConnection,
        ids: &[i64],
        run_id: Option<Uuid>,
    ) -> Result<usize, Box<dyn Error + Send + Sync>> {
        if ids.is_empty() {
            return Ok(0);
        }

        sqlx::query(
            r#"
            INSERT INTO equipment_removal_log (equipment_id, serial_number, site_id, run_id)
            SELECT id, serial_number, site_id, $2 FROM equipment WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(run_id)
        .execute(&mut *conn)
        .await?;

        let result = sqlx::query("DELETE FROM equipment WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() as usize)
    }
}

#[async_trait]
impl DeleteBatch<Postgres> for EquipmentRepositoryImpl {
    async fn delete_batch(
        &self,
        ids: &[i64],
        run_id: Option<Uuid>,
    ) -> Result<usize, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        Self::delete_batch_impl(&mut **transaction, ids, run_id).await
    }
}
