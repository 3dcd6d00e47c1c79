use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::models::EquipmentModel;
use crate::normalize::normalize;

/// Site part of a deduplication key.
///
/// Records without a resolved site are grouped by the canonical form of their
/// free-text reference, so two different unresolved references never merge.
/// A record with neither has no site key and is never grouped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SiteKey {
    Resolved(i64),
    Unresolved(String),
}

impl SiteKey {
    pub fn of(record: &EquipmentModel) -> Option<Self> {
        match record.site_id {
            Some(site_id) => Some(SiteKey::Resolved(site_id)),
            None => record
                .site_reference()
                .map(normalize)
                .filter(|reference| !reference.is_empty())
                .map(SiteKey::Unresolved),
        }
    }
}

/// One `(site, serial)` group that held more than one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupGroup {
    pub site: SiteKey,
    pub serial: String,
    pub kept: i64,
    pub dropped: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupPlan {
    pub groups: Vec<DedupGroup>,
    retained: Vec<EquipmentModel>,
    dropped: Vec<EquipmentModel>,
}

impl DedupPlan {
    /// Records that survive, in input order.
    pub fn retained(&self) -> &[EquipmentModel] {
        &self.retained
    }

    pub fn into_retained(self) -> Vec<EquipmentModel> {
        self.retained
    }

    pub fn dropped(&self) -> &[EquipmentModel] {
        &self.dropped
    }

    pub fn dropped_ids(&self) -> Vec<i64> {
        self.dropped.iter().map(|record| record.id).collect()
    }

    pub fn groups_processed(&self) -> usize {
        self.groups.len()
    }

    pub fn kept_count(&self) -> usize {
        self.retained.len()
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn is_noop(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Plans removal of duplicate equipment.
///
/// Records sharing a site key and a canonical serial form a group; the lowest
/// id (earliest import) is kept. Records without a usable serial, or without
/// any site information, are never grouped.
pub fn deduplicate(records: Vec<EquipmentModel>) -> DedupPlan {
    let mut groups: BTreeMap<(SiteKey, String), Vec<i64>> = BTreeMap::new();
    for record in &records {
        let (Some(site), Some(serial)) = (SiteKey::of(record), record.canonical_serial()) else {
            continue;
        };
        groups.entry((site, serial)).or_default().push(record.id);
    }

    let mut plan = DedupPlan::default();
    let mut dropped_ids = HashSet::new();

    for ((site, serial), mut ids) in groups {
        if ids.len() < 2 {
            continue;
        }
        ids.sort_unstable();
        ids.dedup();
        let kept = ids.remove(0);
        if ids.is_empty() {
            continue;
        }
        tracing::info!(site = ?site, serial = %serial, kept, dropped = ?ids, "duplicate equipment group");
        dropped_ids.extend(ids.iter().copied());
        plan.groups.push(DedupGroup {
            site,
            serial,
            kept,
            dropped: ids,
        });
    }

    for record in records {
        if dropped_ids.contains(&record.id) {
            plan.dropped.push(record);
        } else {
            plan.retained.push(record);
        }
    }

    tracing::info!(
        groups = plan.groups_processed(),
        kept = plan.kept_count(),
        dropped = plan.dropped_count(),
        "deduplication planned"
    );
    plan
}
