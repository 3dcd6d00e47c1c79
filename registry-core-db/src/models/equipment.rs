use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use registry_core_api::{EquipmentCategory, EquipmentStatus};
use serde::{Deserialize, Serialize};

use crate::models::Identifiable;
use crate::normalize::normalize_serial;

/// # Documentation
/// - One physical unit (radio, navigation aid, surveillance or power asset)
/// - `id` grows with every import, so a lower id means an earlier import
/// - `serial_number` may be missing or a placeholder left by the spreadsheet importer
/// - `site_reference` is the free-text site value exactly as imported
/// - `site_id` stays empty until the reference resolves to a catalog site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentModel {
    pub id: i64,

    pub serial_number: Option<HeaplessString<100>>,

    pub category: EquipmentCategory,

    pub site_reference: Option<HeaplessString<200>>,

    pub site_id: Option<i64>,

    pub status: EquipmentStatus,

    pub imported_at: DateTime<Utc>,
}

impl EquipmentModel {
    /// Serial in comparison form, `None` when absent or a known placeholder.
    pub fn canonical_serial(&self) -> Option<String> {
        self.serial_number
            .as_ref()
            .and_then(|serial| normalize_serial(serial.as_str()))
    }

    pub fn site_reference(&self) -> Option<&str> {
        self.site_reference.as_ref().map(|r| r.as_str())
    }
}

impl Identifiable for EquipmentModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}
