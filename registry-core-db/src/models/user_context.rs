use registry_core_api::Role;
use serde::{Deserialize, Serialize};

/// # Documentation
/// - Resolved scope of the requesting principal, handed over by the session layer
/// - Site-bound roles need `assigned_site_id`, region-bound roles need `assigned_region_id`
/// - Only unrestricted roles may leave both empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContextModel {
    pub user_id: i64,

    pub role: Role,

    pub assigned_site_id: Option<i64>,

    pub assigned_region_id: Option<i64>,
}

impl UserContextModel {
    pub fn national(user_id: i64) -> Self {
        Self {
            user_id,
            role: Role::National,
            assigned_site_id: None,
            assigned_region_id: None,
        }
    }

    pub fn technician(user_id: i64, site_id: Option<i64>) -> Self {
        Self {
            user_id,
            role: Role::Technician,
            assigned_site_id: site_id,
            assigned_region_id: None,
        }
    }

    pub fn regional(user_id: i64, region_id: Option<i64>) -> Self {
        Self {
            user_id,
            role: Role::RegionalCoordinator,
            assigned_site_id: None,
            assigned_region_id: region_id,
        }
    }
}
