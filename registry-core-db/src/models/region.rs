use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use crate::models::Identifiable;

/// # Documentation
/// - Region (FIR) grouping of sites
/// - `code` is the short designator (e.g. `DOZ`), `name` the display name, often prefixed with `FIR`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionModel {
    pub id: i64,

    pub code: HeaplessString<10>,

    pub name: HeaplessString<100>,
}

impl Identifiable for RegionModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}
