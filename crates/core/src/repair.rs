//! Repair of BOM entries damaged by an old serialization bug.

use serde::Serialize;
use tracing::warn;

use crate::model::{display_name_from_key, BomEntry, BomLine, Inventory, Projects};
use crate::normalize::normalize;
use crate::resolve::find_by_normalized_id;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Corrupted entries rewritten as valid lines.
    pub repaired: usize,
    /// Of those, entries whose quantity came from a matching inventory part.
    pub recovered_from_inventory: usize,
}

/// Replace every corrupted BOM entry with a valid line, in place.
///
/// The quantity is recovered from the matching part's per-project count; with
/// no matching part the line keeps a de-slugified name and a zero quantity.
pub fn repair(projects: &mut Projects, inventory: &Inventory) -> RepairReport {
    let mut report = RepairReport::default();

    for (project_id, project) in projects.iter_mut() {
        for (key, entry) in project.bom.iter_mut() {
            if !matches!(entry, BomEntry::Corrupted(_)) {
                continue;
            }

            let matched = inventory
                .get_key_value(key.as_str())
                .or_else(|| find_by_normalized_id(&normalize(key), inventory));
            let line = match matched {
                Some((_, part)) => {
                    report.recovered_from_inventory += 1;
                    BomLine::new(
                        part.name.clone(),
                        part.projects.get(project_id).copied().unwrap_or(0),
                    )
                }
                None => BomLine::new(display_name_from_key(key), 0),
            };

            warn!(
                project = %project_id,
                key = %key,
                quantity = line.quantity,
                "repaired corrupted BOM line"
            );
            *entry = BomEntry::Valid(line);
            report.repaired += 1;
        }
    }

    report
}
