use async_trait::async_trait;
use registry_core_db::models::EquipmentModel;
use registry_core_db::repository::find_by_site_id::FindBySiteId;
use sqlx::{PgConnection, Postgres};
use std::error::Error;

use super::repo_impl::{rows_to_models, EquipmentRepositoryImpl, EQUIPMENT_COLUMNS};

impl EquipmentRepositoryImpl {
    pub(crate) async fn find_by_site_id_impl(
        conn: &mut PgConnection,
        site_id: i64,
    ) -> Result<Vec<EquipmentModel>, Box<dyn Error + Send + Sync>> {
        let query = format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE site_id = $1 ORDER BY id");
        let rows = sqlx::query(&query).bind(site_id).fetch_all(&mut *conn).await?;
        rows_to_models(rows)
    }

    pub(crate) async fn find_unresolved_impl(
        conn: &mut PgConnection,
    ) -> Result<Vec<EquipmentModel>, Box<dyn Error + Send + Sync>> {
        let query = format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE site_id IS NULL ORDER BY id");
        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows_to_models(rows)
    }
}

#[async_trait]
impl FindBySiteId<Postgres, EquipmentModel> for EquipmentRepositoryImpl {
    async fn find_by_site_id(&self, site_id: i64) -> Result<Vec<EquipmentModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        Self::find_by_site_id_impl(&mut **transaction, site_id).await
    }

    async fn find_unresolved(&self) -> Result<Vec<EquipmentModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        Self::find_unresolved_impl(&mut **transaction).await
    }
}
