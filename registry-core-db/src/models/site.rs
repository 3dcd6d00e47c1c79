use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use crate::models::{Identifiable, Index, Indexable};
use crate::normalize::normalize;
use crate::utils::hash_as_i64;

/// # Documentation
/// - One physical facility (airport or equivalent)
/// - `id` is assigned once and never changes; names and codes may be corrected
/// - `local_code` is the 3-letter designator, `icao_code` the optional 4-letter ICAO location indicator
/// - `region_id` points at the FIR grouping; a site without one fails catalog construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteModel {
    pub id: i64,

    pub name: HeaplessString<100>,

    pub local_code: HeaplessString<3>,

    pub icao_code: Option<HeaplessString<4>>,

    pub region_id: Option<i64>,
}

/// Index row keeping the canonical code hashes of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteIdxModel {
    pub id: i64,

    pub region_id: Option<i64>,

    pub local_code_hash: i64,

    pub icao_code_hash: Option<i64>,
}

impl SiteModel {
    pub fn icao(&self) -> Option<&str> {
        self.icao_code.as_ref().map(|c| c.as_str())
    }
}

impl Identifiable for SiteModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Indexable for SiteModel {
    type IndexType = SiteIdxModel;

    fn to_index(&self) -> Result<Self::IndexType, String> {
        // Codes are hashed in canonical form so "mlg" and "MLG " collide
        let local_code_hash = hash_as_i64(&normalize(self.local_code.as_str()))?;
        let icao_code_hash = self
            .icao()
            .map(|code| hash_as_i64(&normalize(code)))
            .transpose()?;

        Ok(SiteIdxModel {
            id: self.id,
            region_id: self.region_id,
            local_code_hash,
            icao_code_hash,
        })
    }
}

impl Identifiable for SiteIdxModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Index for SiteIdxModel {}
