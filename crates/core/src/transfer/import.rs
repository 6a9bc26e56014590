//! Turning external JSON and tables into core record shapes.
//!
//! Parsing is separated from application: every `parse_*` function either
//! returns a fully validated payload or an error, so an import never commits
//! half of a file.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::model::{
    coerce_quantity, inventory_from_value, parse_quantity, projects_from_value, Bom, BomEntry,
    BomLine, CleanupReport, Inventory, Part, Projects,
};
use crate::normalize::normalize;
use crate::policy::MatchPolicy;
use crate::resolve::resolve_id;
use crate::transfer::tabular::{parse_table, TabularRecord};
use crate::transfer::TransferError;

pub const ID_COLUMNS: &[&str] = &["part id", "id"];
pub const NAME_COLUMNS: &[&str] = &["name", "part name", "component"];
pub const TYPE_COLUMNS: &[&str] = &["type"];
pub const QUANTITY_COLUMNS: &[&str] = &["quantity"];
pub const URL_COLUMNS: &[&str] = &["purchase url"];
pub const PROJECTS_COLUMNS: &[&str] = &["projects"];

/// The three accepted JSON import shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonImport {
    /// `{ "inventory": {...}, "projects": {...} }`
    Snapshot { inventory: Inventory, projects: Projects },
    /// A flat part mapping from older exports.
    Inventory(Inventory),
    /// `{ "parts": [ {name, quantity}, ... ] }`
    Bom(BomImport),
}

/// A BOM read from an external file, keyed by normalized part name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BomImport {
    pub project_name: Option<String>,
    pub bom: Bom,
    /// Purchase links carried by the file, by BOM key.
    pub purchase_urls: BTreeMap<String, String>,
}

impl BomImport {
    fn add(&mut self, key: String, name: &str, quantity: u32, url: Option<&str>) {
        match self.bom.get_mut(&key).and_then(BomEntry::as_valid_mut) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => {
                self.bom.insert(key.clone(), BomEntry::Valid(BomLine::new(name, quantity)));
            }
        }
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.purchase_urls.entry(key).or_insert_with(|| url.to_string());
        }
    }
}

/// Parse JSON import text and classify its shape.
///
/// Returned alongside is a count of entries dropped as invalid.
pub fn parse_json_import(text: &str) -> Result<(JsonImport, CleanupReport), TransferError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(mut root) = value else {
        return Err(TransferError::UnsupportedShape("expected a JSON object".to_string()));
    };

    if let Some(parts) = root.remove("parts") {
        let Value::Array(parts) = parts else {
            return Err(TransferError::UnsupportedShape("\"parts\" must be a list".to_string()));
        };
        let project_name = root
            .get("projectName")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let mut bom = BomImport { project_name, ..Default::default() };
        for part in parts {
            let Value::Object(fields) = part else {
                continue;
            };
            let name = fields.get("name").and_then(Value::as_str).map(str::trim).unwrap_or("");
            let key = normalize(name);
            if key.is_empty() {
                continue;
            }
            let quantity = fields.get("quantity").map(coerce_quantity).unwrap_or(0);
            let url = fields.get("purchaseUrl").and_then(Value::as_str);
            bom.add(key, name, quantity, url);
        }
        return Ok((JsonImport::Bom(bom), CleanupReport::default()));
    }

    let is_snapshot = root.contains_key("inventory") || root.contains_key("projects");
    if is_snapshot {
        for key in ["inventory", "projects"] {
            if root.get(key).is_some_and(|v| !v.is_object()) {
                return Err(TransferError::UnsupportedShape(format!("\"{key}\" must be an object")));
            }
        }
        let (inventory, mut report) =
            inventory_from_value(root.remove("inventory").unwrap_or(Value::Null));
        let (projects, project_report) =
            projects_from_value(root.remove("projects").unwrap_or(Value::Null));
        report.absorb(&project_report);
        return Ok((JsonImport::Snapshot { inventory, projects }, report));
    }

    let (inventory, report) = inventory_from_value(Value::Object(root));
    Ok((JsonImport::Inventory(inventory), report))
}

/// One inventory row from a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRow {
    pub line: u64,
    pub id: Option<String>,
    pub name: String,
    pub part_type: Option<String>,
    pub quantity: u32,
    pub purchase_url: Option<String>,
    /// `None` when the row has no Projects value.
    pub projects: Option<BTreeMap<String, u32>>,
}

/// Parse an inventory table. Rows without a name are skipped.
pub fn parse_inventory_table(text: &str) -> Result<Vec<PartRow>, TransferError> {
    let table = parse_table(text)?;
    if !table.has_column(NAME_COLUMNS) {
        return Err(TransferError::MissingColumn("Name"));
    }

    let mut rows = Vec::new();
    for record in &table.records {
        let Some(name) = record.get(NAME_COLUMNS) else {
            debug!(line = record.line, "skipping row without a name");
            continue;
        };
        let projects = match record.get(PROJECTS_COLUMNS) {
            Some(cell) => Some(parse_project_quantities(cell).map_err(|message| {
                TransferError::Row { line: record.line, message }
            })?),
            None => None,
        };
        rows.push(PartRow {
            line: record.line,
            id: record.get(ID_COLUMNS).map(str::to_string),
            name: name.to_string(),
            part_type: record.get(TYPE_COLUMNS).map(str::to_string),
            quantity: row_quantity(record)?,
            purchase_url: record.get(URL_COLUMNS).map(str::to_string),
            projects,
        });
    }
    Ok(rows)
}

/// Parse a BOM table (`Part Name, Quantity, Purchase URL`, optional `Part ID`).
pub fn parse_bom_table(text: &str) -> Result<BomImport, TransferError> {
    let table = parse_table(text)?;
    if !table.has_column(NAME_COLUMNS) {
        return Err(TransferError::MissingColumn("Part Name"));
    }

    let mut bom = BomImport::default();
    for record in &table.records {
        let Some(name) = record.get(NAME_COLUMNS) else {
            continue;
        };
        let key = record.get(ID_COLUMNS).map(str::to_string).unwrap_or_else(|| normalize(name));
        if key.is_empty() {
            continue;
        }
        bom.add(key, name, row_quantity(record)?, record.get(URL_COLUMNS));
    }
    Ok(bom)
}

/// Parse `projectId:qty` pairs joined by `;`. A pair without a quantity counts as 1.
pub fn parse_project_quantities(cell: &str) -> Result<BTreeMap<String, u32>, String> {
    let mut out = BTreeMap::new();
    for pair in cell.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (project_id, qty) = match pair.split_once(':') {
            Some((id, qty)) => {
                let qty = parse_quantity(qty)
                    .ok_or_else(|| format!("invalid project quantity in '{pair}'"))?;
                (id.trim(), qty)
            }
            None => (pair, 1),
        };
        if project_id.is_empty() {
            continue;
        }
        out.insert(project_id.to_string(), qty);
    }
    Ok(out)
}

fn row_quantity(record: &TabularRecord) -> Result<u32, TransferError> {
    match record.get(QUANTITY_COLUMNS) {
        Some(cell) => parse_quantity(cell).ok_or_else(|| TransferError::Row {
            line: record.line,
            message: format!("invalid quantity '{cell}'"),
        }),
        None => Ok(0),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Upsert parsed rows into the inventory.
///
/// Rows with an id are written under that id. Rows without one are matched
/// through the resolver by name, falling back to the normalized name as a new
/// id. A row's Projects value replaces the part's project quantities and is
/// mirrored into the BOM of each project that exists.
pub fn apply_inventory_rows(
    rows: Vec<PartRow>,
    inventory: &mut Inventory,
    projects: &mut Projects,
    policy: &MatchPolicy,
) -> InventoryImportSummary {
    let mut summary = InventoryImportSummary::default();

    for row in rows {
        let target = match &row.id {
            Some(id) => id.clone(),
            None => {
                let key = normalize(&row.name);
                resolve_id(&key, Some(&row.name), inventory, policy).unwrap_or(key)
            }
        };
        if target.is_empty() {
            summary.skipped += 1;
            continue;
        }

        let existed = inventory.contains_key(&target);
        let part = inventory.entry(target.clone()).or_insert_with(|| {
            Part::new(row.name.clone(), row.quantity)
                .with_purchase_url(row.purchase_url.clone())
                .with_type(row.part_type.clone())
        });
        if existed {
            summary.updated += 1;
            part.name = row.name.clone();
            part.quantity = row.quantity;
            if row.purchase_url.is_some() {
                part.purchase_url = row.purchase_url.clone();
            }
            if row.part_type.is_some() {
                part.part_type = row.part_type.clone();
            }
        } else {
            summary.created += 1;
        }

        if let Some(quantities) = row.projects {
            for (project_id, qty) in &quantities {
                if let Some(project) = projects.get_mut(project_id) {
                    let line = BomLine::new(part.name.clone(), *qty);
                    project.bom.insert(target.clone(), BomEntry::Valid(line));
                }
            }
            part.projects = quantities;
        }
    }

    summary
}
