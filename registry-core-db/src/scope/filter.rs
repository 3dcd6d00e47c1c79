use registry_core_api::{RegistryError, RegistryResult, ScopeLevel};
use serde::{Deserialize, Serialize};

use crate::models::{EquipmentModel, UserContextModel};
use crate::repository::pagination::{Page, PageRequest};
use crate::resolver::{resolve_code, SiteCatalog};

/// Which equipment records a principal may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ScopePredicate {
    All,
    /// Records whose resolved site lies in the region.
    Region { region_id: i64 },
    /// Records resolved to the site, plus unresolved records whose free-text
    /// reference is one of the site's codes.
    Site { site_id: i64 },
    And {
        left: Box<ScopePredicate>,
        right: Box<ScopePredicate>,
    },
}

impl ScopePredicate {
    pub fn matches(&self, record: &EquipmentModel, catalog: &SiteCatalog) -> bool {
        match self {
            ScopePredicate::All => true,
            ScopePredicate::Region { region_id } => record
                .site_id
                .and_then(|site_id| catalog.region_of(site_id))
                .is_some_and(|region| region == *region_id),
            ScopePredicate::Site { site_id } => match record.site_id {
                Some(resolved) => resolved == *site_id,
                None => record
                    .site_reference()
                    .and_then(|reference| resolve_code(reference, catalog))
                    .is_some_and(|site| site.id == *site_id),
            },
            ScopePredicate::And { left, right } => {
                left.matches(record, catalog) && right.matches(record, catalog)
            }
        }
    }

    /// Conjunction, dropping `All` operands.
    pub fn and(self, other: ScopePredicate) -> ScopePredicate {
        match (self, other) {
            (ScopePredicate::All, other) => other,
            (this, ScopePredicate::All) => this,
            (this, other) if this == other => this,
            (this, other) => ScopePredicate::And {
                left: Box::new(this),
                right: Box::new(other),
            },
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, ScopePredicate::All)
    }
}

/// Turns a user context into a scope predicate.
///
/// A scoped role without its assignment, or with an assignment the catalog
/// does not know, is a configuration error and never an empty result.
pub fn build_filter(
    context: &UserContextModel,
    catalog: &SiteCatalog,
) -> RegistryResult<ScopePredicate> {
    let config_error = |reason: String| {
        tracing::warn!(user_id = context.user_id, role = %context.role, %reason, "invalid user scope");
        RegistryError::ScopeConfigurationError {
            user_id: context.user_id,
            reason,
        }
    };

    match context.role.scope_level() {
        ScopeLevel::Unrestricted => Ok(ScopePredicate::All),
        ScopeLevel::Region => {
            let region_id = context
                .assigned_region_id
                .ok_or_else(|| config_error(format!("role {} requires an assigned region", context.role)))?;
            if catalog.region(region_id).is_none() {
                return Err(config_error(format!("assigned region {region_id} is not in the catalog")));
            }
            Ok(ScopePredicate::Region { region_id })
        }
        ScopeLevel::Site => {
            let site_id = context
                .assigned_site_id
                .ok_or_else(|| config_error(format!("role {} requires an assigned site", context.role)))?;
            if catalog.get(site_id).is_none() {
                return Err(config_error(format!("assigned site {site_id} is not in the catalog")));
            }
            Ok(ScopePredicate::Site { site_id })
        }
    }
}

/// Keeps the records the predicate admits, in input order.
pub fn apply(
    predicate: &ScopePredicate,
    records: Vec<EquipmentModel>,
    catalog: &SiteCatalog,
) -> Vec<EquipmentModel> {
    let total = records.len();
    let visible: Vec<EquipmentModel> = records
        .into_iter()
        .filter(|record| predicate.matches(record, catalog))
        .collect();
    tracing::debug!(total, visible = visible.len(), "scope filter applied");
    visible
}

pub fn apply_page(
    predicate: &ScopePredicate,
    records: Vec<EquipmentModel>,
    catalog: &SiteCatalog,
    page: PageRequest,
) -> Page<EquipmentModel> {
    let visible = apply(predicate, records, catalog);
    let total = visible.len();
    let items = visible
        .into_iter()
        .skip(page.offset)
        .take(page.limit)
        .collect();
    Page::new(items, total, page.limit, page.offset)
}
