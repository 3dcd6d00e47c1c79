use serde::{Deserialize, Serialize};
use validator::Validate;

/// Optional site / region narrowing passed with an equipment listing request.
///
/// `site` accepts a display name fragment, a 3-letter local code or an ICAO
/// code. `region` accepts a region code or name, with or without the `FIR`
/// prefix. Empty or blank values mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SiteFilterParams {
    #[validate(length(max = 100))]
    pub site: Option<String>,

    #[validate(length(max = 100))]
    pub region: Option<String>,
}

impl SiteFilterParams {
    pub fn is_empty(&self) -> bool {
        self.site.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.region.as_deref().map_or(true, |r| r.trim().is_empty())
    }
}
