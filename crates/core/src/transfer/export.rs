//! Snapshot, inventory and per-project BOM exports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{display_name_from_key, Inventory, Project, Projects};
use crate::policy::MatchPolicy;
use crate::resolve::resolve;
use crate::transfer::tabular::write_table;
use crate::transfer::TransferError;

pub const INVENTORY_HEADERS: [&str; 6] =
    ["Part ID", "Name", "Type", "Quantity", "Purchase URL", "Projects"];

pub const BOM_HEADERS: [&str; 3] = ["Part Name", "Quantity", "Purchase URL"];

#[derive(Serialize)]
struct SnapshotRef<'a> {
    inventory: &'a Inventory,
    projects: &'a Projects,
}

/// Pretty-printed `{ "inventory": ..., "projects": ... }`.
pub fn export_snapshot_json(
    inventory: &Inventory,
    projects: &Projects,
) -> Result<String, TransferError> {
    Ok(serde_json::to_string_pretty(&SnapshotRef { inventory, projects })?)
}

/// `projectId:qty` pairs joined by `;`.
pub fn format_project_quantities(quantities: &BTreeMap<String, u32>) -> String {
    quantities.iter().map(|(id, qty)| format!("{id}:{qty}")).collect::<Vec<_>>().join(";")
}

/// Inventory as a table with the standard header row.
pub fn export_inventory_table(inventory: &Inventory) -> Result<String, TransferError> {
    let rows = inventory.iter().map(|(id, part)| {
        vec![
            id.clone(),
            part.name.clone(),
            part.part_type.clone().unwrap_or_default(),
            part.quantity.to_string(),
            part.purchase_url.clone().unwrap_or_default(),
            format_project_quantities(&part.projects),
        ]
    });
    write_table(&INVENTORY_HEADERS, rows)
}

/// Per-project BOM export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomExport {
    pub project_name: String,
    pub export_date: String,
    pub parts: Vec<BomExportPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomExportPart {
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_url: Option<String>,
}

fn bom_export_parts(
    project: &Project,
    inventory: &Inventory,
    policy: &MatchPolicy,
) -> Vec<BomExportPart> {
    project
        .valid_lines()
        .map(|(key, line)| {
            let candidate_name = Some(line.name.as_str()).filter(|n| !n.trim().is_empty());
            let found = resolve(key, None, inventory, policy);
            let name = match candidate_name {
                Some(name) => name.to_string(),
                None => found
                    .map(|m| m.part.name.clone())
                    .unwrap_or_else(|| display_name_from_key(key)),
            };
            BomExportPart {
                name,
                quantity: line.quantity,
                purchase_url: found.and_then(|m| m.part.purchase_url.clone()),
            }
        })
        .collect()
}

/// BOM as a `Part Name, Quantity, Purchase URL` table.
pub fn export_bom_table(
    project: &Project,
    inventory: &Inventory,
    policy: &MatchPolicy,
) -> Result<String, TransferError> {
    let rows = bom_export_parts(project, inventory, policy).into_iter().map(|part| {
        vec![part.name, part.quantity.to_string(), part.purchase_url.unwrap_or_default()]
    });
    write_table(&BOM_HEADERS, rows)
}

/// BOM as `{projectName, exportDate, parts}` JSON.
pub fn export_bom_json(
    project: &Project,
    inventory: &Inventory,
    policy: &MatchPolicy,
    exported_at: DateTime<Utc>,
) -> Result<String, TransferError> {
    let doc = BomExport {
        project_name: project.name.clone(),
        export_date: exported_at.to_rfc3339(),
        parts: bom_export_parts(project, inventory, policy),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}
