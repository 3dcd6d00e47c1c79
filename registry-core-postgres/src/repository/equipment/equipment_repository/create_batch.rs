use async_trait::async_trait;
use registry_core_db::models::EquipmentModel;
use registry_core_db::repository::create_batch::CreateBatch;
use sqlx::{PgConnection, Postgres, Row};
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::EquipmentRepositoryImpl;

impl EquipmentRepositoryImpl {
    /// Inserts imported equipment; ids come from the sequence, so the
    /// incoming `id` is ignored and the assigned one returned.
    pub(crate) async fn create_batch_impl(
        conn: &mut PgConnection,
        items: Vec<EquipmentModel>,
    ) -> Result<Vec<EquipmentModel>, Box<dyn Error + Send + Sync>> {
        let mut saved_items = Vec::with_capacity(items.len());
        for mut item in items {
            let row = sqlx::query(
                r#"
                INSERT INTO equipment (serial_number, category, site_reference, site_id, status, imported_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(item.serial_number.as_ref().map(|s| s.as_str()))
            .bind(item.category.as_str())
            .bind(item.site_reference())
            .bind(item.site_id)
            .bind(item.status.as_str())
            .bind(item.imported_at)
            .fetch_one(&mut *conn)
            .await?;
            item.id = row.try_get("id")?;
            saved_items.push(item);
        }
        Ok(saved_items)
    }
}

#[async_trait]
impl CreateBatch<Postgres, EquipmentModel> for EquipmentRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<EquipmentModel>,
        run_id: Option<Uuid>,
    ) -> Result<Vec<EquipmentModel>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        let saved = Self::create_batch_impl(&mut **transaction, items).await?;
        tracing::debug!(count = saved.len(), run_id = ?run_id, "equipment imported");
        Ok(saved)
    }
}
