//! BOM-versus-inventory comparison.
//!
//! [`reconcile`] reports per-line stock status for one project;
//! [`aggregate_requirements`] totals what every project needs per part.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{display_name_from_key, Inventory, Project, Projects, StockStatus};
use crate::normalize::normalize;
use crate::policy::MatchPolicy;
use crate::resolve::{find_by_normalized_id, find_by_normalized_name, resolve, MatchKind};

/// Inventory entry a BOM line resolved to through a non-exact tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedPart {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: MatchKind,
}

/// Status of one BOM line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReport {
    pub key: String,
    pub name: String,
    pub have: u32,
    pub need: u32,
    pub status: StockStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchedPart>,
}

/// Per-project reconciliation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub project_name: String,
    pub lines: Vec<LineReport>,
    pub missing_count: usize,
    pub low_count: usize,
    pub sufficient_count: usize,
}

impl ProjectReport {
    pub fn is_buildable(&self) -> bool {
        self.missing_count == 0 && self.low_count == 0
    }
}

/// Compare one project's BOM against the inventory.
///
/// Lines that are not well-formed are skipped; unresolved keys count as
/// missing with nothing on hand.
pub fn reconcile(project: &Project, inventory: &Inventory, policy: &MatchPolicy) -> ProjectReport {
    let mut report = ProjectReport { project_name: project.name.clone(), ..Default::default() };

    for (key, line) in project.valid_lines() {
        let found = resolve(key, None, inventory, policy);

        let have = found.map(|m| m.part.quantity).unwrap_or(0);
        let need = line.quantity;
        let status = StockStatus::assess(have, need);
        match status {
            StockStatus::Missing => report.missing_count += 1,
            StockStatus::Low => report.low_count += 1,
            StockStatus::Sufficient => report.sufficient_count += 1,
        }

        let name = if line.name.trim().is_empty() {
            display_name_from_key(key)
        } else {
            line.name.clone()
        };
        let matched = found.filter(|m| !m.kind.is_exact()).map(|m| MatchedPart {
            id: m.id.to_string(),
            name: m.part.name.clone(),
            kind: m.kind,
        });

        report.lines.push(LineReport { key: key.clone(), name, have, need, status, matched });
    }

    report
}

/// One project's share of an aggregated requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNeed {
    pub project_name: String,
    pub quantity: u32,
}

/// Everything all projects need of one normalized part key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub key: String,
    pub name: String,
    pub total: u32,
    pub breakdown: Vec<ProjectNeed>,
    pub inventory_qty: u32,
    pub status: StockStatus,
}

/// Aggregated requirements, sorted missing < low < sufficient, then by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequirementsReport {
    pub entries: Vec<Requirement>,
}

impl RequirementsReport {
    pub fn get(&self, key: &str) -> Option<&Requirement> {
        self.entries.iter().find(|r| r.key == key)
    }

    pub fn count(&self, status: StockStatus) -> usize {
        self.entries.iter().filter(|r| r.status == status).count()
    }
}

#[derive(Default)]
struct Accumulator {
    first_key: String,
    line_name: Option<String>,
    total: u32,
    breakdown: Vec<ProjectNeed>,
}

/// Total the needs of every project per normalized key and compare against stock.
///
/// Corrupted lines are skipped here, so callers run the repair pass first.
pub fn aggregate_requirements(projects: &Projects, inventory: &Inventory) -> RequirementsReport {
    let mut totals: BTreeMap<String, Accumulator> = BTreeMap::new();

    for project in projects.values() {
        for (key, line) in project.valid_lines() {
            let normalized = normalize(key);
            let agg_key = if normalized.is_empty() { key.to_lowercase() } else { normalized };

            let acc = totals.entry(agg_key).or_insert_with(|| Accumulator {
                first_key: key.clone(),
                ..Default::default()
            });
            acc.total = acc.total.saturating_add(line.quantity);
            acc.breakdown
                .push(ProjectNeed { project_name: project.name.clone(), quantity: line.quantity });
            if acc.line_name.is_none() && !line.name.trim().is_empty() {
                acc.line_name = Some(line.name.clone());
            }
        }
    }

    let mut entries: Vec<Requirement> = totals
        .into_iter()
        .map(|(key, acc)| {
            let by_id = find_by_normalized_id(&key, inventory);
            let name = by_id
                .map(|(_, part)| part.name.clone())
                .or(acc.line_name)
                .unwrap_or_else(|| display_name_from_key(&acc.first_key));
            let inventory_qty = by_id
                .or_else(|| find_by_normalized_name(&key, inventory))
                .map(|(_, part)| part.quantity)
                .unwrap_or(0);
            Requirement {
                status: StockStatus::assess(inventory_qty, acc.total),
                key,
                name,
                total: acc.total,
                breakdown: acc.breakdown,
                inventory_qty,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        a.status.cmp(&b.status).then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    RequirementsReport { entries }
}
