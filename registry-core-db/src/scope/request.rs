use registry_core_api::{RegistryError, RegistryResult, SiteFilterParams};
use validator::Validate;

use super::filter::{build_filter, ScopePredicate};
use crate::models::UserContextModel;
use crate::resolver::{resolve, SiteCatalog};

/// Scope of a listing request: the user's own scope narrowed by the optional
/// `site` and `region` parameters.
///
/// A parameter pointing outside the user's scope is rejected with
/// `Unauthorized` instead of being silently emptied.
pub fn request_predicate(
    context: &UserContextModel,
    params: &SiteFilterParams,
    catalog: &SiteCatalog,
) -> RegistryResult<ScopePredicate> {
    params.validate()?;
    let base = build_filter(context, catalog)?;
    if params.is_empty() {
        return Ok(base);
    }

    let mut predicate = base.clone();

    if let Some(site) = non_blank(params.site.as_deref()) {
        let resolved = resolve(site, catalog).into_result(site)?;
        let site_id = resolved.site.id;
        if !permits_site(&base, site_id, catalog) {
            return Err(unauthorized(context, format!("site {site_id} is outside the assigned scope")));
        }
        predicate = predicate.and(ScopePredicate::Site { site_id });
    }

    if let Some(region) = non_blank(params.region.as_deref()) {
        let region_id = catalog
            .find_region(region)
            .map(|region| region.id)
            .ok_or_else(|| RegistryError::ResolutionNotFound {
                identifier: region.to_string(),
            })?;
        if !permits_region(&base, region_id, catalog) {
            return Err(unauthorized(context, format!("region {region_id} is outside the assigned scope")));
        }
        // a site scope inside the region already implies it, and keeps its
        // unresolved code references that a region conjunct would drop
        if !lies_within_region(&predicate, region_id, catalog) {
            predicate = predicate.and(ScopePredicate::Region { region_id });
        }
    }

    tracing::debug!(user_id = context.user_id, ?predicate, "request scope built");
    Ok(predicate)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn unauthorized(context: &UserContextModel, reason: String) -> RegistryError {
    tracing::warn!(user_id = context.user_id, %reason, "filter would widen user scope");
    RegistryError::Unauthorized {
        user_id: context.user_id,
        reason,
    }
}

fn permits_site(base: &ScopePredicate, site_id: i64, catalog: &SiteCatalog) -> bool {
    match base {
        ScopePredicate::All => true,
        ScopePredicate::Region { region_id } => catalog.region_of(site_id) == Some(*region_id),
        ScopePredicate::Site { site_id: own } => *own == site_id,
        ScopePredicate::And { left, right } => {
            permits_site(left, site_id, catalog) && permits_site(right, site_id, catalog)
        }
    }
}

fn permits_region(base: &ScopePredicate, region_id: i64, catalog: &SiteCatalog) -> bool {
    match base {
        ScopePredicate::All => true,
        ScopePredicate::Region { region_id: own } => *own == region_id,
        ScopePredicate::Site { site_id } => catalog.region_of(*site_id) == Some(region_id),
        ScopePredicate::And { left, right } => {
            permits_region(left, region_id, catalog) && permits_region(right, region_id, catalog)
        }
    }
}

fn lies_within_region(predicate: &ScopePredicate, region_id: i64, catalog: &SiteCatalog) -> bool {
    match predicate {
        ScopePredicate::All => false,
        ScopePredicate::Region { region_id: own } => *own == region_id,
        ScopePredicate::Site { site_id } => catalog.region_of(*site_id) == Some(region_id),
        ScopePredicate::And { left, right } => {
            lies_within_region(left, region_id, catalog) || lies_within_region(right, region_id, catalog)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::catalog::test_utils::mendoza_catalog;
    use crate::scope::filter::apply;
    use crate::scope::filter::test_utils::create_test_equipment;

    fn params(site: Option<&str>, region: Option<&str>) -> SiteFilterParams {
        SiteFilterParams {
            site: site.map(str::to_string),
            region: region.map(str::to_string),
        }
    }

    #[test]
    fn test_no_parameters_keeps_user_scope() {
        let catalog = mendoza_catalog();
        let predicate =
            request_predicate(&UserContextModel::national(1), &SiteFilterParams::default(), &catalog)
                .unwrap();
        assert_eq!(predicate, ScopePredicate::All);
    }

    #[test]
    fn test_national_user_narrows_by_site_name() {
        let catalog = mendoza_catalog();
        let predicate = request_predicate(
            &UserContextModel::national(1),
            &params(Some("Malargüe"), None),
            &catalog,
        )
        .unwrap();
        assert_eq!(
            predicate,
            ScopePredicate::Site { site_id: 34 }
        );
    }

    #[test]
    fn test_national_user_narrows_by_region_with_prefix() {
        let catalog = mendoza_catalog();
        let predicate = request_predicate(
            &UserContextModel::national(1),
            &params(None, Some("FIR Córdoba")),
            &catalog,
        )
        .unwrap();
        assert_eq!(predicate, ScopePredicate::Region { region_id: 2 });
    }

    #[test]
    fn test_ambiguous_site_filter_is_an_error() {
        let catalog = mendoza_catalog();
        let result = request_predicate(
            &UserContextModel::national(1),
            &params(Some("Villa"), None),
            &catalog,
        );
        assert!(matches!(result, Err(RegistryError::ResolutionAmbiguous { .. })));
    }

    #[test]
    fn test_unknown_region_filter_is_not_found() {
        let catalog = mendoza_catalog();
        let result = request_predicate(
            &UserContextModel::national(1),
            &params(None, Some("Comodoro")),
            &catalog,
        );
        assert!(matches!(result, Err(RegistryError::ResolutionNotFound { .. })));
    }

    #[test]
    fn test_regional_user_may_narrow_to_own_site() {
        let catalog = mendoza_catalog();
        let predicate = request_predicate(
            &UserContextModel::regional(8, Some(1)),
            &params(Some("MDZ"), None),
            &catalog,
        )
        .unwrap();
        assert!(matches!(predicate, ScopePredicate::And { .. }));
    }

    #[test]
    fn test_regional_user_cannot_widen() {
        let catalog = mendoza_catalog();
        let result = request_predicate(
            &UserContextModel::regional(8, Some(1)),
            &params(Some("VME"), None),
            &catalog,
        );
        assert!(matches!(result, Err(RegistryError::Unauthorized { user_id: 8, .. })));

        let result = request_predicate(
            &UserContextModel::regional(8, Some(1)),
            &params(None, Some("CBA")),
            &catalog,
        );
        assert!(matches!(result, Err(RegistryError::Unauthorized { .. })));
    }

    #[test]
    fn test_technician_may_repeat_own_site() {
        let catalog = mendoza_catalog();
        let predicate = request_predicate(
            &UserContextModel::technician(7, Some(34)),
            &params(Some("SAMM"), Some("DOZ")),
            &catalog,
        )
        .unwrap();
        assert_eq!(predicate, ScopePredicate::Site { site_id: 34 });
    }

    #[test]
    fn test_own_region_filter_keeps_unresolved_code_references() {
        let catalog = mendoza_catalog();
        let predicate = request_predicate(
            &UserContextModel::technician(7, Some(34)),
            &params(None, Some("FIR Mendoza")),
            &catalog,
        )
        .unwrap();
        let records = vec![
            create_test_equipment(1, Some("VOR-1"), Some(34), None),
            create_test_equipment(2, None, None, Some("mlg")),
            create_test_equipment(3, Some("ILS-7"), Some(35), None),
        ];
        let visible: Vec<i64> = apply(&predicate, records, &catalog).iter().map(|r| r.id).collect();
        assert_eq!(visible, vec![1, 2]);
    }

    #[test]
    fn test_site_outside_region_filter_keeps_region_conjunct() {
        let catalog = mendoza_catalog();
        let predicate = request_predicate(
            &UserContextModel::national(1),
            &params(Some("VME"), Some("DOZ")),
            &catalog,
        )
        .unwrap();
        assert!(matches!(predicate, ScopePredicate::And { .. }));
    }

    #[test]
    fn test_invalid_parameters_are_rejected_before_resolution() {
        let catalog = mendoza_catalog();
        let long = "x".repeat(101);
        let result = request_predicate(
            &UserContextModel::national(1),
            &params(Some(&long), None),
            &catalog,
        );
        assert!(matches!(result, Err(RegistryError::ValidationError(_))));
    }
}
