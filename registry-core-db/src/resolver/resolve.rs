use registry_core_api::{MatchKind, RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};

use super::catalog::{CatalogEntry, SiteCatalog};
use crate::models::SiteModel;
use crate::normalize::{classify, normalize, IdentifierToken};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSite {
    pub site: SiteModel,
    pub kind: MatchKind,
}

/// Outcome of resolving one identifier against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(ResolvedSite),
    /// Every equally plausible site, ascending by id. Never narrowed implicitly.
    Ambiguous { candidates: Vec<SiteModel> },
    NotFound,
}

impl Resolution {
    pub fn site_id(&self) -> Option<i64> {
        match self {
            Resolution::Resolved(resolved) => Some(resolved.site.id),
            _ => None,
        }
    }

    pub fn candidate_ids(&self) -> Vec<i64> {
        match self {
            Resolution::Resolved(resolved) => vec![resolved.site.id],
            Resolution::Ambiguous { candidates } => candidates.iter().map(|s| s.id).collect(),
            Resolution::NotFound => Vec::new(),
        }
    }

    pub fn into_result(self, identifier: &str) -> RegistryResult<ResolvedSite> {
        match self {
            Resolution::Resolved(resolved) => Ok(resolved),
            Resolution::Ambiguous { candidates } => Err(RegistryError::ResolutionAmbiguous {
                identifier: identifier.to_string(),
                candidates: candidates.iter().map(|s| s.id).collect(),
            }),
            Resolution::NotFound => Err(RegistryError::ResolutionNotFound {
                identifier: identifier.to_string(),
            }),
        }
    }
}

/// Resolves a raw identifier: exact code first (ICAO, then local code), then
/// a two-way substring match on display names unless the identifier is a
/// 3-letter code.
pub fn resolve(identifier: &str, catalog: &SiteCatalog) -> Resolution {
    let token = classify(&normalize(identifier));
    resolve_token(&token, catalog)
}

pub fn resolve_token(token: &IdentifierToken, catalog: &SiteCatalog) -> Resolution {
    let canonical = match token {
        IdentifierToken::Empty => return Resolution::NotFound,
        other => other.as_str(),
    };

    if let Some(entry) = match_code(canonical, catalog) {
        return Resolution::Resolved(ResolvedSite {
            site: entry.site.clone(),
            kind: MatchKind::Code,
        });
    }

    if token.is_code() {
        return Resolution::NotFound;
    }

    let mut candidates: Vec<SiteModel> = catalog
        .entries()
        .filter(|entry| {
            !entry.canonical_name.is_empty()
                && (entry.canonical_name.contains(canonical)
                    || canonical.contains(entry.canonical_name.as_str()))
        })
        .map(|entry| entry.site.clone())
        .collect();

    match candidates.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Resolved(ResolvedSite {
            site: candidates.remove(0),
            kind: MatchKind::Name,
        }),
        _ => Resolution::Ambiguous { candidates },
    }
}

/// Code-only resolution, used where a name match would be too loose.
pub fn resolve_code<'a>(identifier: &str, catalog: &'a SiteCatalog) -> Option<&'a SiteModel> {
    let canonical = normalize(identifier);
    if canonical.is_empty() {
        return None;
    }
    match_code(&canonical, catalog).map(|entry| &entry.site)
}

fn match_code<'a>(canonical: &str, catalog: &'a SiteCatalog) -> Option<&'a CatalogEntry> {
    catalog
        .find_by_icao(canonical)
        .or_else(|| catalog.find_by_code(canonical))
}

/// Opt-in narrowing of an ambiguous candidate list with region context.
///
/// When no candidate lies in the region the original ambiguity is kept: the
/// row still needs a human decision.
pub fn narrow_by_region(candidates: Vec<SiteModel>, region_id: i64) -> Resolution {
    let (mut in_region, others): (Vec<SiteModel>, Vec<SiteModel>) = candidates
        .into_iter()
        .partition(|site| site.region_id == Some(region_id));

    match in_region.len() {
        0 => Resolution::Ambiguous { candidates: others },
        1 => Resolution::Resolved(ResolvedSite {
            site: in_region.remove(0),
            kind: MatchKind::Name,
        }),
        _ => Resolution::Ambiguous {
            candidates: in_region,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::catalog::test_utils::*;
    use super::*;

    #[test]
    fn test_code_match_wins() {
        let catalog = mendoza_catalog();
        let resolution = resolve("MLG", &catalog);
        assert_eq!(resolution.site_id(), Some(34));
        assert!(matches!(
            resolution,
            Resolution::Resolved(ResolvedSite {
                kind: MatchKind::Code,
                ..
            })
        ));
    }

    #[test]
    fn test_icao_match() {
        let catalog = mendoza_catalog();
        assert_eq!(resolve(" samr ", &catalog).site_id(), Some(36));
    }

    #[test]
    fn test_code_takes_precedence_over_name_substring() {
        let catalog = SiteCatalog::build(
            vec![
                create_test_site(1, "Malargue", "MLG", None, Some(1)),
                create_test_site(2, "Base MLG Norte", "BMN", None, Some(1)),
            ],
            vec![create_test_region(1, "DOZ", "FIR Mendoza")],
        )
        .unwrap();

        let resolution = resolve("MLG", &catalog);
        assert_eq!(resolution.site_id(), Some(1));
        assert!(!matches!(resolution, Resolution::Ambiguous { .. }));
    }

    #[test]
    fn test_unknown_three_letter_code_skips_name_pass() {
        let catalog = SiteCatalog::build(
            vec![create_test_site(1, "Samala", "SML", None, Some(1))],
            vec![create_test_region(1, "DOZ", "FIR Mendoza")],
        )
        .unwrap();
        // "ala" is a substring of "samala" but a 3-letter token is a code
        assert_eq!(resolve("ALA", &catalog), Resolution::NotFound);
    }

    #[test]
    fn test_accented_name_resolves_by_name() {
        let catalog = mendoza_catalog();
        let resolution = resolve("Malargüe", &catalog);
        assert_eq!(resolution.site_id(), Some(34));
        assert!(matches!(
            resolution,
            Resolution::Resolved(ResolvedSite {
                kind: MatchKind::Name,
                ..
            })
        ));
    }

    #[test]
    fn test_identifier_containing_site_name() {
        let catalog = mendoza_catalog();
        let resolution = resolve("Aeropuerto Internacional Malargüe", &catalog);
        assert_eq!(resolution.site_id(), Some(34));
    }

    #[test]
    fn test_overlapping_names_are_ambiguous() {
        let catalog = mendoza_catalog();
        match resolve("Villa", &catalog) {
            Resolution::Ambiguous { candidates } => {
                let ids: Vec<i64> = candidates.iter().map(|s| s.id).collect();
                assert_eq!(ids, vec![50, 51]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_no_match_is_not_found() {
        let catalog = mendoza_catalog();
        assert_eq!(resolve("Ushuaia", &catalog), Resolution::NotFound);
        assert_eq!(resolve("XYZ", &catalog), Resolution::NotFound);
    }

    #[test]
    fn test_empty_identifier_is_not_found() {
        let catalog = mendoza_catalog();
        assert_eq!(resolve("", &catalog), Resolution::NotFound);
        assert_eq!(resolve("   ", &catalog), Resolution::NotFound);
    }

    #[test]
    fn test_into_result_carries_candidates() {
        let catalog = mendoza_catalog();
        let error = resolve("Villa", &catalog).into_result("Villa").unwrap_err();
        assert_eq!(
            error,
            RegistryError::ResolutionAmbiguous {
                identifier: "Villa".to_string(),
                candidates: vec![50, 51],
            }
        );

        let error = resolve("Ushuaia", &catalog).into_result("Ushuaia").unwrap_err();
        assert!(matches!(error, RegistryError::ResolutionNotFound { .. }));
    }

    #[test]
    fn test_resolve_code_ignores_names() {
        let catalog = mendoza_catalog();
        assert_eq!(resolve_code("mlg", &catalog).map(|s| s.id), Some(34));
        assert_eq!(resolve_code("SAMM", &catalog).map(|s| s.id), Some(34));
        assert!(resolve_code("Malargue", &catalog).is_none());
        assert!(resolve_code("", &catalog).is_none());
    }

    #[test]
    fn test_narrow_by_region() {
        let catalog = mendoza_catalog();
        let Resolution::Ambiguous { candidates } = resolve("Villa", &catalog) else {
            panic!("expected ambiguity");
        };

        assert_eq!(narrow_by_region(candidates.clone(), 2).site_id(), Some(50));

        match narrow_by_region(candidates, 7) {
            Resolution::Ambiguous { candidates } => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity to be kept, got {other:?}"),
        }
    }
}
