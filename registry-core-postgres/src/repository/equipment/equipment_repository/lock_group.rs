use registry_core_db::models::EquipmentModel;
use sqlx::{PgConnection, Row};
use std::error::Error;

use super::repo_impl::{rows_to_models, EquipmentRepositoryImpl, EQUIPMENT_COLUMNS};

impl EquipmentRepositoryImpl {
    /// Site groups that may hold duplicates: more than one record with a
    /// serial. `None` stands for the records without a resolved site.
    pub(crate) async fn duplicate_candidate_groups_impl(
        conn: &mut PgConnection,
    ) -> Result<Vec<Option<i64>>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            r#"
            SELECT site_id FROM equipment
            WHERE serial_number IS NOT NULL
            GROUP BY site_id
            HAVING COUNT(*) > 1
            ORDER BY site_id NULLS LAST
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut groups = Vec::with_capacity(rows.len());
        for row in rows {
            groups.push(row.try_get("site_id")?);
        }
        Ok(groups)
    }

    /// Loads and row-locks one site group for the rest of the transaction.
    pub(crate) async fn lock_group_impl(
        conn: &mut PgConnection,
        site_id: Option<i64>,
    ) -> Result<Vec<EquipmentModel>, Box<dyn Error + Send + Sync>> {
        let rows = match site_id {
            Some(site_id) => {
                let query = format!(
                    "SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE site_id = $1 ORDER BY id FOR UPDATE"
                );
                sqlx::query(&query).bind(site_id).fetch_all(&mut *conn).await?
            }
            None => {
                let query = format!(
                    "SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE site_id IS NULL ORDER BY id FOR UPDATE"
                );
                sqlx::query(&query).fetch_all(&mut *conn).await?
            }
        };
        rows_to_models(rows)
    }
}
