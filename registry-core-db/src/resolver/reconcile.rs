use moka::sync::Cache;
use registry_core_api::MatchKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::catalog::SiteCatalog;
use super::resolve::{narrow_by_region, resolve_token, Resolution};
use crate::models::{EquipmentModel, ImportRow};
use crate::normalize::{classify, normalize};

/// Per-row result of import reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    Resolved {
        row: usize,
        column: String,
        identifier: String,
        site_id: i64,
        kind: MatchKind,
    },
    Ambiguous {
        row: usize,
        identifier: String,
        candidate_ids: Vec<i64>,
    },
    NotFound {
        row: usize,
        identifiers: Vec<String>,
    },
    Skipped {
        row: usize,
    },
}

impl RowOutcome {
    pub fn needs_review(&self) -> bool {
        matches!(self, RowOutcome::Ambiguous { .. } | RowOutcome::NotFound { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub rows: Vec<RowOutcome>,
    pub resolved: usize,
    pub ambiguous: usize,
    pub not_found: usize,
    pub skipped: usize,
}

impl ImportReport {
    fn push(&mut self, outcome: RowOutcome) {
        match &outcome {
            RowOutcome::Resolved { .. } => self.resolved += 1,
            RowOutcome::Ambiguous { .. } => self.ambiguous += 1,
            RowOutcome::NotFound { .. } => self.not_found += 1,
            RowOutcome::Skipped { .. } => self.skipped += 1,
        }
        self.rows.push(outcome);
    }

    pub fn needs_review(&self) -> impl Iterator<Item = &RowOutcome> {
        self.rows.iter().filter(|outcome| outcome.needs_review())
    }
}

/// # Documentation
/// - Matches import rows to catalog sites, trying the site-bearing columns in precedence order
/// - Identical identifiers inside one batch are resolved once (bounded cache keyed by canonical form)
/// - Region narrowing of ambiguous matches only happens when enabled
pub struct ImportReconciler {
    catalog: Arc<SiteCatalog>,
    cache: Cache<String, Resolution>,
    narrow_by_region: bool,
}

impl ImportReconciler {
    pub fn new(catalog: Arc<SiteCatalog>, cache_capacity: u64) -> Self {
        Self {
            catalog,
            cache: Cache::new(cache_capacity),
            narrow_by_region: false,
        }
    }

    pub fn with_region_narrowing(mut self, enabled: bool) -> Self {
        self.narrow_by_region = enabled;
        self
    }

    pub fn catalog(&self) -> &SiteCatalog {
        &self.catalog
    }

    /// Resolution of a raw identifier, memoized by canonical form.
    pub fn resolve(&self, identifier: &str) -> Resolution {
        let canonical = normalize(identifier);
        if let Some(hit) = self.cache.get(&canonical) {
            return hit;
        }
        let resolution = resolve_token(&classify(&canonical), &self.catalog);
        self.cache.insert(canonical, resolution.clone());
        resolution
    }

    pub fn reconcile_row(&self, row: &ImportRow) -> RowOutcome {
        let fields = row.site_fields();
        if fields.is_empty() {
            tracing::debug!(row = row.row_number, "import row has no site identifier");
            return RowOutcome::Skipped {
                row: row.row_number,
            };
        }

        let region_id = if self.narrow_by_region {
            row.region_hint()
                .and_then(|hint| self.catalog.find_region(hint))
                .map(|region| region.id)
        } else {
            None
        };

        let mut first_ambiguity: Option<(String, Vec<i64>)> = None;

        for field in &fields {
            let mut resolution = self.resolve(&field.value);
            if let (Resolution::Ambiguous { candidates }, Some(region_id)) = (&resolution, region_id) {
                resolution = narrow_by_region(candidates.clone(), region_id);
            }

            match resolution {
                Resolution::Resolved(resolved) => {
                    return RowOutcome::Resolved {
                        row: row.row_number,
                        column: field.column.clone(),
                        identifier: field.value.clone(),
                        site_id: resolved.site.id,
                        kind: resolved.kind,
                    };
                }
                Resolution::Ambiguous { candidates } => {
                    if first_ambiguity.is_none() {
                        first_ambiguity = Some((
                            field.value.clone(),
                            candidates.iter().map(|site| site.id).collect(),
                        ));
                    }
                }
                Resolution::NotFound => {}
            }
        }

        match first_ambiguity {
            Some((identifier, candidate_ids)) => {
                tracing::info!(
                    row = row.row_number,
                    identifier = %identifier,
                    candidates = ?candidate_ids,
                    "ambiguous site identifier, needs review"
                );
                RowOutcome::Ambiguous {
                    row: row.row_number,
                    identifier,
                    candidate_ids,
                }
            }
            None => {
                let identifiers: Vec<String> = fields.into_iter().map(|f| f.value).collect();
                tracing::info!(
                    row = row.row_number,
                    identifiers = ?identifiers,
                    "no site matches import row, needs review"
                );
                RowOutcome::NotFound {
                    row: row.row_number,
                    identifiers,
                }
            }
        }
    }

    pub fn reconcile(&self, rows: &[ImportRow]) -> ImportReport {
        let mut report = ImportReport::default();
        for row in rows {
            report.push(self.reconcile_row(row));
        }
        tracing::info!(
            rows = rows.len(),
            resolved = report.resolved,
            ambiguous = report.ambiguous,
            not_found = report.not_found,
            skipped = report.skipped,
            "import reconciliation finished"
        );
        report
    }
}

/// Site assignments found by re-resolving unresolved equipment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backfill {
    /// `(equipment id, site id)` pairs safe to persist.
    pub assignments: Vec<(i64, i64)>,
    /// Equipment ids whose reference is ambiguous or unknown.
    pub needs_review: Vec<i64>,
}

/// Re-resolves the free-text reference of every record that has no site yet.
/// Only unambiguous matches become assignments.
pub fn re_resolve(records: &[EquipmentModel], catalog: &SiteCatalog) -> Backfill {
    let mut backfill = Backfill::default();
    for record in records.iter().filter(|r| r.site_id.is_none()) {
        let Some(reference) = record.site_reference() else {
            continue;
        };
        match resolve_token(&classify(&normalize(reference)), catalog) {
            Resolution::Resolved(resolved) => {
                backfill.assignments.push((record.id, resolved.site.id));
            }
            Resolution::Ambiguous { .. } | Resolution::NotFound => {
                backfill.needs_review.push(record.id);
            }
        }
    }
    tracing::info!(
        assigned = backfill.assignments.len(),
        needs_review = backfill.needs_review.len(),
        "re-resolution of unresolved equipment finished"
    );
    backfill
}

#[cfg(test)]
mod tests {
    use super::super::catalog::test_utils::*;
    use super::*;
    use chrono::Utc;
    use heapless::String as HeaplessString;
    use registry_core_api::{EquipmentCategory, EquipmentStatus};

    fn reconciler() -> ImportReconciler {
        ImportReconciler::new(Arc::new(mendoza_catalog()), 100)
    }

    fn unresolved(id: i64, reference: Option<&str>, site_id: Option<i64>) -> EquipmentModel {
        EquipmentModel {
            id,
            serial_number: None,
            category: EquipmentCategory::Radio,
            site_reference: reference.map(|r| HeaplessString::try_from(r).unwrap()),
            site_id,
            status: EquipmentStatus::Ok,
            imported_at: Utc::now(),
        }
    }

    #[test]
    fn test_designator_column_wins() {
        let row = ImportRow::from_pairs(
            2,
            [("Desginador 3 Letras", "MLG"), ("Sitio", "Villa")],
        );
        assert_eq!(
            reconciler().reconcile_row(&row),
            RowOutcome::Resolved {
                row: 2,
                column: "Desginador 3 Letras".to_string(),
                identifier: "MLG".to_string(),
                site_id: 34,
                kind: MatchKind::Code,
            }
        );
    }

    #[test]
    fn test_falls_back_to_free_text_site() {
        let row = ImportRow::from_pairs(3, [("Desginador 3 Letras", "XXX"), ("Sitio", "Malargüe")]);
        match reconciler().reconcile_row(&row) {
            RowOutcome::Resolved { site_id, kind, column, .. } => {
                assert_eq!(site_id, 34);
                assert_eq!(kind, MatchKind::Name);
                assert_eq!(column, "Sitio");
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_row_needs_review() {
        let row = ImportRow::from_pairs(4, [("Sitio", "Villa"), ("FIR", "FIR Córdoba")]);
        let outcome = reconciler().reconcile_row(&row);
        assert!(outcome.needs_review());
        assert_eq!(
            outcome,
            RowOutcome::Ambiguous {
                row: 4,
                identifier: "Villa".to_string(),
                candidate_ids: vec![50, 51],
            }
        );
    }

    #[test]
    fn test_region_narrowing_is_opt_in() {
        let row = ImportRow::from_pairs(4, [("Sitio", "Villa"), ("FIR", "FIR Córdoba")]);
        let outcome = reconciler().with_region_narrowing(true).reconcile_row(&row);
        match outcome {
            RowOutcome::Resolved { site_id, .. } => assert_eq!(site_id, 50),
            other => panic!("expected narrowing to resolve, got {other:?}"),
        }
    }

    #[test]
    fn test_report_counts() {
        let rows = vec![
            ImportRow::from_pairs(1, [("Desginador 3 Letras", "MDZ")]),
            ImportRow::from_pairs(2, [("Sitio", "Malargue")]),
            ImportRow::from_pairs(3, [("Sitio", "Malargüe")]),
            ImportRow::from_pairs(4, [("Sitio", "Villa")]),
            ImportRow::from_pairs(5, [("Sitio", "Ushuaia")]),
            ImportRow::from_pairs(6, [("Marca", "Park Air")]),
        ];
        let report = reconciler().reconcile(&rows);

        assert_eq!(report.resolved, 3);
        assert_eq!(report.ambiguous, 1);
        assert_eq!(report.not_found, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.needs_review().count(), 2);
        assert_eq!(report.rows.len(), 6);
    }

    #[test]
    fn test_cached_resolution_matches_direct_resolution() {
        let reconciler = reconciler();
        let first = reconciler.resolve("Malargüe");
        let second = reconciler.resolve("  MALARGUE ");
        assert_eq!(first, second);
        assert_eq!(first.site_id(), Some(34));
    }

    #[test]
    fn test_report_serializes_for_review_tooling() {
        let rows = vec![ImportRow::from_pairs(9, [("Sitio", "Ushuaia")])];
        let report = reconciler().reconcile(&rows);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows"][0]["outcome"], "not_found");
        assert_eq!(json["rows"][0]["identifiers"][0], "Ushuaia");
    }

    #[test]
    fn test_re_resolve_only_touches_unresolved_records() {
        let catalog = mendoza_catalog();
        let records = vec![
            unresolved(1, Some("Malargüe"), None),
            unresolved(2, Some("MDZ"), None),
            unresolved(3, Some("Villa"), None),
            unresolved(4, Some("Ushuaia"), None),
            unresolved(5, None, None),
            unresolved(6, Some("MLG"), Some(35)),
        ];
        let backfill = re_resolve(&records, &catalog);
        assert_eq!(backfill.assignments, vec![(1, 34), (2, 35)]);
        assert_eq!(backfill.needs_review, vec![3, 4]);
    }
}
