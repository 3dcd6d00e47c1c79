use registry_core_api::{CatalogIssue, RegistryError, RegistryResult};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{RegionModel, SiteModel};
use crate::normalize::{classify, normalize, normalize_region_name, IdentifierToken};

/// A catalog site together with its pre-computed canonical forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub site: SiteModel,
    pub canonical_name: String,
    pub canonical_code: String,
    pub canonical_icao: Option<String>,
    pub region_id: i64,
}

/// # Documentation
/// - Immutable, validated snapshot of the known sites and regions
/// - Built once per batch run or per refresh, then shared read-only (`Arc<SiteCatalog>`)
/// - Construction fails with `CatalogIntegrityError` listing every problem found
#[derive(Debug, Clone, Default)]
pub struct SiteCatalog {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<i64, usize>,
    by_code: HashMap<String, usize>,
    by_icao: HashMap<String, usize>,
    regions: HashMap<i64, RegionModel>,
}

impl SiteCatalog {
    pub fn build(sites: Vec<SiteModel>, regions: Vec<RegionModel>) -> RegistryResult<Self> {
        let regions: HashMap<i64, RegionModel> =
            regions.into_iter().map(|region| (region.id, region)).collect();

        let mut sites = sites;
        sites.sort_by_key(|site| site.id);

        let mut issues = Vec::new();
        let mut code_owners: BTreeMap<String, Vec<i64>> = BTreeMap::new();
        let mut entries = Vec::with_capacity(sites.len());
        let mut by_id = HashMap::with_capacity(sites.len());
        let mut seen_ids = HashSet::with_capacity(sites.len());

        for site in sites {
            if !seen_ids.insert(site.id) {
                issues.push(CatalogIssue::DuplicateSiteId { site_id: site.id });
                continue;
            }

            let canonical_code = normalize(site.local_code.as_str());
            if !matches!(classify(&canonical_code), IdentifierToken::Code(_)) {
                tracing::warn!(site_id = site.id, code = %site.local_code, "site code is not a 3-letter code");
            }
            code_owners
                .entry(canonical_code.clone())
                .or_default()
                .push(site.id);

            let canonical_icao = site.icao().map(normalize);
            if let Some(icao) = &canonical_icao {
                if !matches!(classify(icao), IdentifierToken::Icao(_)) {
                    tracing::warn!(site_id = site.id, icao = %icao, "site ICAO code is not 4 letters");
                }
                code_owners.entry(icao.clone()).or_default().push(site.id);
            }

            let region_id = match site.region_id {
                None => {
                    issues.push(CatalogIssue::MissingRegion { site_id: site.id });
                    continue;
                }
                Some(region_id) if !regions.contains_key(&region_id) => {
                    issues.push(CatalogIssue::UnknownRegion {
                        site_id: site.id,
                        region_id,
                    });
                    continue;
                }
                Some(region_id) => region_id,
            };

            by_id.insert(site.id, entries.len());
            entries.push(CatalogEntry {
                canonical_name: normalize(site.name.as_str()),
                canonical_code,
                canonical_icao,
                region_id,
                site,
            });
        }

        for (code, site_ids) in code_owners {
            if site_ids.len() > 1 {
                issues.push(CatalogIssue::DuplicateCode { code, site_ids });
            }
        }

        if !issues.is_empty() {
            tracing::error!(issues = issues.len(), "site catalog failed integrity checks");
            return Err(RegistryError::CatalogIntegrityError(issues));
        }

        let by_code = entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| (entry.canonical_code.clone(), pos))
            .collect();
        let by_icao = entries
            .iter()
            .enumerate()
            .filter_map(|(pos, entry)| entry.canonical_icao.clone().map(|icao| (icao, pos)))
            .collect();

        tracing::debug!(sites = entries.len(), regions = regions.len(), "site catalog built");

        Ok(Self {
            entries,
            by_id,
            by_code,
            by_icao,
            regions,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending site id order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn get(&self, site_id: i64) -> Option<&CatalogEntry> {
        self.by_id.get(&site_id).map(|&pos| &self.entries[pos])
    }

    pub fn site(&self, site_id: i64) -> Option<&SiteModel> {
        self.get(site_id).map(|entry| &entry.site)
    }

    pub fn region_of(&self, site_id: i64) -> Option<i64> {
        self.get(site_id).map(|entry| entry.region_id)
    }

    pub fn region(&self, region_id: i64) -> Option<&RegionModel> {
        self.regions.get(&region_id)
    }

    /// Lookup by canonical 3-letter local code.
    pub fn find_by_code(&self, canonical: &str) -> Option<&CatalogEntry> {
        self.by_code.get(canonical).map(|&pos| &self.entries[pos])
    }

    /// Lookup by canonical ICAO code.
    pub fn find_by_icao(&self, canonical: &str) -> Option<&CatalogEntry> {
        self.by_icao.get(canonical).map(|&pos| &self.entries[pos])
    }

    /// Region by code (`DOZ`) or by name, with or without the `FIR` prefix.
    pub fn find_region(&self, identifier: &str) -> Option<&RegionModel> {
        let canonical = normalize_region_name(identifier);
        if canonical.is_empty() {
            return None;
        }
        let mut regions: Vec<&RegionModel> = self.regions.values().collect();
        regions.sort_by_key(|region| region.id);
        regions.into_iter().find(|region| {
            normalize(region.code.as_str()) == canonical
                || normalize_region_name(region.name.as_str()) == canonical
        })
    }
}
