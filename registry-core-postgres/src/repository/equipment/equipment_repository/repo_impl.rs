use crate::executor::Executor;
use crate::utils::{get_optional_heapless_string, get_parsed, TryFromRow};
use registry_core_db::models::EquipmentModel;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

pub(crate) const EQUIPMENT_COLUMNS: &str =
    "id, serial_number, category, site_reference, site_id, status, imported_at";

pub struct EquipmentRepositoryImpl {
    pub executor: Executor,
}

impl EquipmentRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for EquipmentModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(EquipmentModel {
            id: row.try_get("id")?,
            serial_number: get_optional_heapless_string(row, "serial_number")?,
            category: get_parsed(row, "category")?,
            site_reference: get_optional_heapless_string(row, "site_reference")?,
            site_id: row.try_get("site_id")?,
            status: get_parsed(row, "status")?,
            imported_at: row.try_get("imported_at")?,
        })
    }
}

pub(crate) fn rows_to_models(rows: Vec<PgRow>) -> Result<Vec<EquipmentModel>, Box<dyn Error + Send + Sync>> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(EquipmentModel::try_from_row(&row)?);
    }
    Ok(items)
}
