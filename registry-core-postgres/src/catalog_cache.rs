use parking_lot::RwLock;
use registry_core_api::{RegistryError, RegistryResult};
use registry_core_db::repository::{ListRegions, ListSites};
use registry_core_db::resolver::SiteCatalog;
use sqlx::Postgres;
use std::sync::Arc;

/// # Documentation
/// - Holds the current site catalog snapshot shared by resolution and scope filtering
/// - Readers clone the `Arc` and never block a refresh for longer than the pointer swap
/// - A refresh that fails integrity checks keeps the previous snapshot
pub struct CatalogCache {
    snapshot: RwLock<Arc<SiteCatalog>>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(SiteCatalog::default())
    }
}

impl CatalogCache {
    pub fn new(catalog: SiteCatalog) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<SiteCatalog> {
        self.snapshot.read().clone()
    }

    pub fn replace(&self, catalog: SiteCatalog) -> Arc<SiteCatalog> {
        let catalog = Arc::new(catalog);
        *self.snapshot.write() = catalog.clone();
        catalog
    }

    /// Loads sites and regions and swaps in a freshly built catalog.
    pub async fn refresh<S, R>(&self, sites: &S, regions: &R) -> RegistryResult<Arc<SiteCatalog>>
    where
        S: ListSites<Postgres> + ?Sized,
        R: ListRegions<Postgres> + ?Sized,
    {
        let site_rows = sites
            .list_sites()
            .await
            .map_err(|e| RegistryError::DatabaseError(e.to_string()))?;
        let region_rows = regions
            .list_regions()
            .await
            .map_err(|e| RegistryError::DatabaseError(e.to_string()))?;

        let catalog = SiteCatalog::build(site_rows, region_rows)?;
        tracing::info!(sites = catalog.len(), "site catalog refreshed");
        Ok(self.replace(catalog))
    }
}
