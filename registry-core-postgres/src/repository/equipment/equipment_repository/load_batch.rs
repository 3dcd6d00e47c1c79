use async_trait::async_trait;
use registry_core_db::models::EquipmentModel;
use registry_core_db::repository::load_batch::LoadBatch;
use sqlx::Postgres;
use std::collections::HashMap;
use std::error::Error;

use super::repo_impl::{rows_to_models, EquipmentRepositoryImpl, EQUIPMENT_COLUMNS};

impl EquipmentRepositoryImpl {
    pub(super) async fn load_batch_impl(
        repo: &EquipmentRepositoryImpl,
        ids: &[i64],
    ) -> Result<Vec<Option<EquipmentModel>>, Box<dyn Error + Send + Sync>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE id = ANY($1)");
        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            sqlx::query(&query).bind(ids).fetch_all(&mut **transaction).await?
        };

        let mut item_map: HashMap<i64, EquipmentModel> = rows_to_models(rows)?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        Ok(ids.iter().map(|id| item_map.remove(id)).collect())
    }
}

#[async_trait]
impl LoadBatch<Postgres, EquipmentModel> for EquipmentRepositoryImpl {
    async fn load_batch(&self, ids: &[i64]) -> Result<Vec<Option<EquipmentModel>>, Box<dyn Error + Send + Sync>> {
        Self::load_batch_impl(self, ids).await
    }
}
