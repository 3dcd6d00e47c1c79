use crate::executor::Executor;
use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};
use registry_core_db::models::{SiteIdxModel, SiteModel};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

pub struct SiteRepositoryImpl {
    pub executor: Executor,
}

impl SiteRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for SiteModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(SiteModel {
            id: row.try_get("id")?,
            name: get_heapless_string(row, "name")?,
            local_code: get_heapless_string(row, "local_code")?,
            icao_code: get_optional_heapless_string(row, "icao_code")?,
            region_id: row.try_get("region_id")?,
        })
    }
}

impl TryFromRow<PgRow> for SiteIdxModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(SiteIdxModel {
            id: row.try_get("id")?,
            region_id: row.try_get("region_id")?,
            local_code_hash: row.try_get("local_code_hash")?,
            icao_code_hash: row.try_get("icao_code_hash")?,
        })
    }
}
