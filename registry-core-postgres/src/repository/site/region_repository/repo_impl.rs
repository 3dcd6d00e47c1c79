use crate::executor::Executor;
use crate::utils::{get_heapless_string, TryFromRow};
use registry_core_db::models::RegionModel;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

pub struct RegionRepositoryImpl {
    pub executor: Executor,
}

impl RegionRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for RegionModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(RegionModel {
            id: row.try_get("id")?,
            code: get_heapless_string(row, "code")?,
            name: get_heapless_string(row, "name")?,
        })
    }
}
