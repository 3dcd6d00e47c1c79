pub mod catalog;
pub mod reconcile;
pub mod resolve;

pub use catalog::{CatalogEntry, SiteCatalog};
pub use reconcile::{re_resolve, Backfill, ImportReconciler, ImportReport, RowOutcome};
pub use resolve::{narrow_by_region, resolve, resolve_code, resolve_token, Resolution, ResolvedSite};
