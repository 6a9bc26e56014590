//! Duplicate merging across the whole inventory.
//!
//! Entries whose names normalize to the same key are folded into one canonical
//! entry, and every project BOM is rewritten to point at the survivor.

use std::collections::btree_map::Entry;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::model::{BomEntry, Inventory, Part, Projects};
use crate::normalize::normalize;
use crate::policy::MatchPolicy;

/// One duplicate folded into its canonical entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedPair {
    pub canonical: String,
    pub duplicate: String,
}

/// Outcome of [`merge_duplicates`]. Zero merges is a normal result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub merges: usize,
    pub pairs: Vec<MergedPair>,
    /// BOM lines whose key was redirected to a different id.
    pub bom_lines_rewritten: usize,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.merges > 0 || self.bom_lines_rewritten > 0
    }
}

/// Ids sharing one normalized name, in inventory order.
#[derive(Debug, Clone)]
struct MergeGroup {
    canonical: String,
    duplicates: Vec<String>,
}

#[derive(Debug, Default)]
struct MergePlan {
    groups: Vec<MergeGroup>,
    /// Normalized name -> canonical id, for every group (singletons included).
    canonical_by_name: HashMap<String, String>,
    /// Duplicate id -> canonical id.
    redirects: HashMap<String, String>,
}

impl MergePlan {
    fn build(inventory: &Inventory, policy: &MatchPolicy) -> Self {
        let mut order: Vec<(String, Vec<&String>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (id, part) in inventory {
            let key = normalize(&part.name);
            if key.is_empty() {
                continue;
            }
            match index.get(&key) {
                Some(&slot) => order[slot].1.push(id),
                None => {
                    index.insert(key.clone(), order.len());
                    order.push((key, vec![id]));
                }
            }
        }

        let mut plan = MergePlan::default();
        for (key, ids) in order {
            let mut canonical = ids[0];
            if policy.prefer_complete_records {
                for id in &ids[1..] {
                    if inventory[*id].has_purchase_url() && !inventory[canonical].has_purchase_url()
                    {
                        canonical = *id;
                    }
                }
            }

            plan.canonical_by_name.insert(key, canonical.clone());
            let duplicates: Vec<String> =
                ids.iter().filter(|id| **id != canonical).map(|id| (*id).clone()).collect();
            if duplicates.is_empty() {
                continue;
            }
            for dup in &duplicates {
                plan.redirects.insert(dup.clone(), canonical.clone());
            }
            plan.groups.push(MergeGroup { canonical: canonical.clone(), duplicates });
        }

        plan
    }

    /// Where a BOM key should point after the merge.
    fn target_for(&self, key: &str, inventory: &Inventory) -> String {
        if let Some(canonical) = self.redirects.get(key) {
            return canonical.clone();
        }
        if inventory.contains_key(key) {
            return key.to_string();
        }
        match self.canonical_by_name.get(&normalize(key)) {
            Some(canonical) => canonical.clone(),
            None => key.to_string(),
        }
    }
}

/// Merge every group of same-named entries and rewrite BOM references.
///
/// The caller persists the result. Running this twice in a row performs no
/// further merges.
pub fn merge_duplicates(
    inventory: &mut Inventory,
    projects: &mut Projects,
    policy: &MatchPolicy,
) -> MergeReport {
    let plan = MergePlan::build(inventory, policy);
    let mut report = MergeReport::default();

    for group in &plan.groups {
        for dup_id in &group.duplicates {
            let Some(duplicate) = inventory.remove(dup_id) else {
                continue;
            };
            if let Some(canonical) = inventory.get_mut(&group.canonical) {
                absorb(canonical, duplicate, policy);
                debug!(canonical = %group.canonical, duplicate = %dup_id, "merged duplicate part");
                report.pairs.push(MergedPair {
                    canonical: group.canonical.clone(),
                    duplicate: dup_id.clone(),
                });
            }
        }
    }
    report.merges = report.pairs.len();
    report.bom_lines_rewritten = rewrite_boms(projects, inventory, &plan);

    if report.changed() {
        info!(
            merges = report.merges,
            bom_lines_rewritten = report.bom_lines_rewritten,
            "duplicate merge complete"
        );
    }
    report
}

/// Fold `duplicate` into `canonical`.
fn absorb(canonical: &mut Part, duplicate: Part, policy: &MatchPolicy) {
    canonical.quantity = canonical.quantity.saturating_add(duplicate.quantity);

    for (project_id, qty) in duplicate.projects {
        let slot = canonical.projects.entry(project_id).or_insert(0);
        *slot = slot.saturating_add(qty);
    }

    if let Some(url) = duplicate.purchase_url.filter(|u| !u.trim().is_empty()) {
        let replace = match canonical.purchase_url.as_deref() {
            Some(current) if !current.trim().is_empty() => url.len() > current.len(),
            _ => true,
        };
        if replace {
            canonical.purchase_url = Some(url);
        }
    }

    if let Some(part_type) = duplicate.part_type.filter(|t| !t.trim().is_empty()) {
        if canonical.part_type.is_none() || part_type != policy.generic_type {
            canonical.part_type = Some(part_type);
        }
    }
}

fn rewrite_boms(projects: &mut Projects, inventory: &Inventory, plan: &MergePlan) -> usize {
    let mut rewritten = 0;

    for project in projects.values_mut() {
        let old = std::mem::take(&mut project.bom);
        let (lines, damaged): (Vec<_>, Vec<_>) =
            old.into_iter().partition(|(_, entry)| entry.is_valid());
        // Repair needs the original key, so damaged entries stay put and are
        // never overwritten by a redirected line.
        project.bom.extend(damaged);

        for (key, entry) in lines {
            let BomEntry::Valid(line) = entry else {
                continue;
            };
            let mut target = plan.target_for(&key, inventory);
            if project.bom.get(&target).is_some_and(|e| !e.is_valid()) {
                target = key.clone();
            }
            if target != key {
                rewritten += 1;
            }
            match project.bom.entry(target) {
                Entry::Vacant(slot) => {
                    slot.insert(BomEntry::Valid(line));
                }
                Entry::Occupied(mut slot) => {
                    if let Some(existing) = slot.get_mut().as_valid_mut() {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                        if existing.name.trim().is_empty() {
                            existing.name = line.name;
                        }
                    }
                }
            }
        }
    }

    rewritten
}
