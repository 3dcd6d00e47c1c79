use async_trait::async_trait;
use registry_core_db::models::RegionModel;
use registry_core_db::repository::create_batch::CreateBatch;
use sqlx::{PgConnection, Postgres};
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::RegionRepositoryImpl;

impl RegionRepositoryImpl {
    pub(crate) async fn create_batch_impl(
        conn: &mut PgConnection,
        items: Vec<RegionModel>,
    ) -> Result<Vec<RegionModel>, Box<dyn Error + Send + Sync>> {
        for item in &items {
            sqlx::query("INSERT INTO region (id, code, name) VALUES ($1, $2, $3)")
                .bind(item.id)
                .bind(item.code.as_str())
                .bind(item.name.as_str())
                .execute(&mut *conn)
                .await?;
        }
        Ok(items)
    }
}

#[async_trait]
impl CreateBatch<Postgres, RegionModel> for RegionRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<RegionModel>,
        _run_id: Option<Uuid>,
    ) -> Result<Vec<RegionModel>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        Self::create_batch_impl(&mut **transaction, items).await
    }
}
