use sqlx::{PgConnection, Row};
use std::error::Error;

use super::repo_impl::SiteRepositoryImpl;

impl SiteRepositoryImpl {
    /// Sites owning any of the canonical code hashes, as local or ICAO code.
    pub(crate) async fn find_ids_by_code_hashes_impl(
        conn: &mut PgConnection,
        code_hashes: &[i64],
    ) -> Result<Vec<i64>, Box<dyn Error + Send + Sync>> {
        if code_hashes.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id FROM site_idx
            WHERE local_code_hash = ANY($1) OR icao_code_hash = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(code_hashes)
        .fetch_all(&mut *conn)
        .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("id")?);
        }
        Ok(ids)
    }
}
