use async_trait::async_trait;
use registry_core_api::{CatalogIssue, RegistryError};
use registry_core_db::models::{Indexable, SiteModel};
use registry_core_db::repository::create_batch::CreateBatch;
use sqlx::{PgConnection, Postgres};
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::SiteRepositoryImpl;

impl SiteRepositoryImpl {
    /// Inserts sites and their code index rows.
    ///
    /// A code (local or ICAO) already owned by another site, in storage or
    /// earlier in the same batch, rejects the whole batch.
    pub(crate) async fn create_batch_impl(
        conn: &mut PgConnection,
        items: Vec<SiteModel>,
    ) -> Result<Vec<SiteModel>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch_owners: HashMap<i64, i64> = HashMap::new();
        let mut saved_items = Vec::with_capacity(items.len());

        for item in items {
            let idx = item.to_index()?;
            let hashes: Vec<i64> = std::iter::once(idx.local_code_hash)
                .chain(idx.icao_code_hash)
                .collect();

            let mut owners = Self::find_ids_by_code_hashes_impl(conn, &hashes).await?;
            owners.extend(hashes.iter().filter_map(|hash| batch_owners.get(hash).copied()));

            if !owners.is_empty() {
                owners.push(item.id);
                owners.sort_unstable();
                owners.dedup();
                tracing::error!(site_id = item.id, code = %item.local_code, "site code already in use");
                return Err(Box::new(RegistryError::CatalogIntegrityError(vec![
                    CatalogIssue::DuplicateCode {
                        code: item.local_code.to_string(),
                        site_ids: owners,
                    },
                ])));
            }

            sqlx::query(
                r#"
                INSERT INTO site (id, name, local_code, icao_code, region_id)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(item.id)
            .bind(item.name.as_str())
            .bind(item.local_code.as_str())
            .bind(item.icao())
            .bind(item.region_id)
            .execute(&mut *conn)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO site_idx (id, region_id, local_code_hash, icao_code_hash)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(idx.id)
            .bind(idx.region_id)
            .bind(idx.local_code_hash)
            .bind(idx.icao_code_hash)
            .execute(&mut *conn)
            .await?;

            for hash in hashes {
                batch_owners.insert(hash, item.id);
            }
            saved_items.push(item);
        }

        Ok(saved_items)
    }
}

#[async_trait]
impl CreateBatch<Postgres, SiteModel> for SiteRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<SiteModel>,
        _run_id: Option<Uuid>,
    ) -> Result<Vec<SiteModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        Self::create_batch_impl(&mut **transaction, items).await
    }
}
