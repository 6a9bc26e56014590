//! Decoding of persisted or imported JSON into canonical model shapes.
//!
//! Older data stored a part's `projects` as a plain list of project ids (each
//! counting as one unit). That shape is migrated here, once, so the rest of the
//! crate only ever sees the mapping form.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::model::{coerce_quantity, BomEntry, Inventory, Part, Project, Projects};

/// Counts of entries dropped or fixed by decoding and [`cleanup`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Inventory entries that were null, not objects, or had no usable name.
    pub invalid_parts: usize,
    /// Project entries that were not objects.
    pub invalid_projects: usize,
    /// BOM values that were not objects at all.
    pub malformed_lines: usize,
    /// Per-part project references that were zero or pointed at unknown projects.
    pub stale_references: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.invalid_parts + self.invalid_projects + self.malformed_lines + self.stale_references
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    pub fn absorb(&mut self, other: &CleanupReport) {
        self.invalid_parts += other.invalid_parts;
        self.invalid_projects += other.invalid_projects;
        self.malformed_lines += other.malformed_lines;
        self.stale_references += other.stale_references;
    }
}

/// Build an inventory from a decoded JSON mapping, dropping invalid entries.
///
/// A non-object root yields an empty inventory with nothing counted.
pub fn inventory_from_value(value: Value) -> (Inventory, CleanupReport) {
    let mut report = CleanupReport::default();
    let mut inventory = Inventory::new();

    let Value::Object(entries) = value else {
        return (inventory, report);
    };

    for (id, raw) in entries {
        match part_from_value(raw) {
            Some(part) if !id.trim().is_empty() => {
                inventory.insert(id, part);
            }
            _ => report.invalid_parts += 1,
        }
    }

    (inventory, report)
}

/// Build the project mapping from a decoded JSON mapping.
pub fn projects_from_value(value: Value) -> (Projects, CleanupReport) {
    let mut report = CleanupReport::default();
    let mut projects = Projects::new();

    let Value::Object(entries) = value else {
        return (projects, report);
    };

    for (id, raw) in entries {
        let Value::Object(mut fields) = raw else {
            report.invalid_projects += 1;
            continue;
        };
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());
        let bom = match fields.remove("bom") {
            Some(Value::Object(lines)) => {
                lines.into_iter().map(|(key, line)| (key, BomEntry::classify(line))).collect()
            }
            _ => BTreeMap::new(),
        };
        projects.insert(id, Project { name, bom });
    }

    (projects, report)
}

fn part_from_value(raw: Value) -> Option<Part> {
    let Value::Object(fields) = raw else {
        return None;
    };

    let name = fields.get("name").and_then(Value::as_str).map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return None;
    }

    let optional_text = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Some(Part {
        name: name.to_string(),
        quantity: fields.get("quantity").map(coerce_quantity).unwrap_or(0),
        purchase_url: optional_text("purchaseUrl"),
        part_type: optional_text("type"),
        projects: fields.get("projects").map(project_quantities).unwrap_or_default(),
    })
}

/// Accept either the mapping shape or the legacy list shape.
fn project_quantities(raw: &Value) -> BTreeMap<String, u32> {
    let mut out = BTreeMap::new();
    match raw {
        Value::Object(map) => {
            for (project_id, qty) in map {
                out.insert(project_id.clone(), coerce_quantity(qty));
            }
        }
        Value::Array(ids) => {
            for id in ids {
                let key = match id {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => continue,
                };
                let slot = out.entry(key).or_insert(0u32);
                *slot = slot.saturating_add(1);
            }
        }
        _ => {}
    }
    out
}

/// Defensive pass over in-memory state.
///
/// Removes malformed BOM values, zero per-project quantities, and per-part
/// references to projects that no longer exist.
pub fn cleanup(inventory: &mut Inventory, projects: &mut Projects) -> CleanupReport {
    let mut report = CleanupReport::default();

    for project in projects.values_mut() {
        let before = project.bom.len();
        project.bom.retain(|_, entry| !matches!(entry, BomEntry::Malformed(_)));
        report.malformed_lines += before - project.bom.len();
    }

    for part in inventory.values_mut() {
        let before = part.projects.len();
        part.projects.retain(|project_id, qty| *qty > 0 && projects.contains_key(project_id));
        report.stale_references += before - part.projects.len();
    }

    if !report.is_clean() {
        warn!(
            malformed_lines = report.malformed_lines,
            stale_references = report.stale_references,
            "cleanup removed invalid entries"
        );
    }

    report
}
