//! The application context: inventory, projects, policy and persistence.
//!
//! Every mutating operation validates its input, mutates the in-memory
//! records and then persists both of them. If validation or persistence
//! fails, the records are restored and the error is returned, so a failed
//! call never leaves partial changes behind.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::codec::{self, CodecError, RecordKind, DEFAULT_COMPRESS_THRESHOLD};
use crate::db::StateStore;
use crate::error::{Entity, StockError, StockResult};
use crate::merge::{self, MergeReport};
use crate::model::{
    cleanup, display_name_from_key, inventory_from_value, projects_from_value, Bom, BomEntry,
    BomLine, CleanupReport, Inventory, Part, Project, Projects,
};
use crate::normalize::normalize;
use crate::notify::{NoticeLevel, Notifier, TracingNotifier};
use crate::policy::MatchPolicy;
use crate::reconcile::{self, ProjectReport, RequirementsReport};
use crate::repair::{self, RepairReport};
use crate::resolve::{resolve, resolve_id, Match};
use crate::transfer::{
    apply_inventory_rows, export_bom_json, export_bom_table, export_inventory_table,
    export_snapshot_json, parse_bom_table, parse_inventory_table, parse_json_import, BomFormat,
    BomImport, InventoryImportSummary, JsonImport, TransferError,
};

/// Storage key of the inventory record.
pub const INVENTORY_KEY: &str = "inventory";
/// Storage key of the projects record.
pub const PROJECTS_KEY: &str = "projects";
/// Project name used for a BOM file that does not carry one.
pub const IMPORTED_BOM_NAME: &str = "Imported BOM";

/// Input for [`Store::add_part`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPart {
    /// Defaults to the normalized name.
    pub id: Option<String>,
    pub name: String,
    pub quantity: u32,
    pub purchase_url: Option<String>,
    pub part_type: Option<String>,
}

impl NewPart {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self { name: name.into(), quantity, ..Self::default() }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Field changes for [`Store::update_part`]. `None` leaves a field alone; an
/// empty string clears the purchase link or type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartUpdate {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub purchase_url: Option<String>,
    pub part_type: Option<String>,
}

impl PartUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.purchase_url.is_none()
            && self.part_type.is_none()
    }
}

/// Input for [`Store::create_project`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProject {
    /// Defaults to the normalized name.
    pub id: Option<String>,
    pub name: String,
    pub bom: Bom,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_line(mut self, key: impl Into<String>, line: BomLine) -> Self {
        self.bom.insert(key.into(), BomEntry::Valid(line));
        self
    }
}

/// Which JSON shape an import carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Snapshot,
    Inventory,
    Bom,
}

/// Result of [`Store::import_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub kind: ImportKind,
    pub parts: usize,
    pub projects: usize,
    /// Entries dropped as invalid while reading the file.
    pub dropped: usize,
    /// Id of the project created from a BOM-only file.
    pub created_project: Option<String>,
    pub merge: MergeReport,
}

/// Result of [`Store::import_inventory_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableImportOutcome {
    #[serde(flatten)]
    pub summary: InventoryImportSummary,
    pub merge: MergeReport,
}

pub struct Store<S: StateStore> {
    provider: S,
    inventory: Inventory,
    projects: Projects,
    policy: MatchPolicy,
    compress_threshold: usize,
    notifier: Box<dyn Notifier>,
}

impl<S: StateStore + fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("provider", &self.provider)
            .field("parts", &self.inventory.len())
            .field("projects", &self.projects.len())
            .field("policy", &self.policy)
            .field("compress_threshold", &self.compress_threshold)
            .finish_non_exhaustive()
    }
}

impl<S: StateStore> Store<S> {
    /// Load both records with the default policy and codec threshold.
    pub fn load(provider: S) -> StockResult<Self> {
        Self::load_with(provider, MatchPolicy::default(), DEFAULT_COMPRESS_THRESHOLD)
    }

    /// Load both records, migrating legacy shapes and dropping invalid
    /// entries. Missing records load as empty.
    pub fn load_with(
        provider: S,
        policy: MatchPolicy,
        compress_threshold: usize,
    ) -> StockResult<Self> {
        let inventory_value = read_record(&provider, INVENTORY_KEY, RecordKind::Inventory)?;
        let projects_value = read_record(&provider, PROJECTS_KEY, RecordKind::Projects)?;

        let (mut inventory, mut report) = inventory_from_value(inventory_value);
        let (mut projects, project_report) = projects_from_value(projects_value);
        report.absorb(&project_report);
        report.absorb(&cleanup(&mut inventory, &mut projects));

        info!(
            parts = inventory.len(),
            projects = projects.len(),
            dropped = report.total(),
            "loaded workspace state"
        );

        Ok(Self {
            provider,
            inventory,
            projects,
            policy,
            compress_threshold,
            notifier: Box::new(TracingNotifier),
        })
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn set_notifier(&mut self, notifier: impl Notifier + 'static) {
        self.notifier = Box::new(notifier);
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn projects(&self) -> &Projects {
        &self.projects
    }

    pub fn part(&self, id: &str) -> Option<&Part> {
        self.inventory.get(id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn provider(&self) -> &S {
        &self.provider
    }

    pub fn into_provider(self) -> S {
        self.provider
    }

    /// Resolve a free-text query against the inventory.
    pub fn find_part(&self, query: &str) -> Option<Match<'_>> {
        resolve(query, Some(query), &self.inventory, &self.policy)
    }

    /// Write both records to the provider.
    pub fn persist(&mut self) -> StockResult<()> {
        let inventory = encode_record(
            INVENTORY_KEY,
            RecordKind::Inventory,
            &self.inventory,
            self.compress_threshold,
        )?;
        let projects = encode_record(
            PROJECTS_KEY,
            RecordKind::Projects,
            &self.projects,
            self.compress_threshold,
        )?;
        self.provider
            .set_all(&[(INVENTORY_KEY, inventory.as_str()), (PROJECTS_KEY, projects.as_str())])?;
        debug!(
            inventory_bytes = inventory.len(),
            projects_bytes = projects.len(),
            "persisted state"
        );
        Ok(())
    }

    /// Run `op` against the records and persist; restore the records on any error.
    fn commit<T>(
        &mut self,
        op: impl FnOnce(&mut Inventory, &mut Projects, &MatchPolicy) -> StockResult<T>,
    ) -> StockResult<T> {
        let inventory_backup = self.inventory.clone();
        let projects_backup = self.projects.clone();

        let result = match op(&mut self.inventory, &mut self.projects, &self.policy) {
            Ok(value) => self.persist().map(|()| value),
            Err(err) => Err(err),
        };
        if result.is_err() {
            self.inventory = inventory_backup;
            self.projects = projects_backup;
        }
        result
    }

    fn announce<T>(
        &self,
        result: StockResult<T>,
        success: impl FnOnce(&T) -> String,
    ) -> StockResult<T> {
        match &result {
            Ok(value) => self.notifier.notify(NoticeLevel::Success, &success(value)),
            Err(err) => self.notifier.notify(NoticeLevel::Error, &err.to_string()),
        }
        result
    }

    /// Add a new part. Returns its id.
    pub fn add_part(&mut self, new: NewPart) -> StockResult<String> {
        let result = self.commit(|inventory, _, _| {
            let name = new.name.trim();
            if name.is_empty() {
                return Err(StockError::InvalidInput("part name is required".to_string()));
            }
            let id = match new.id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => normalize(name),
            };
            if id.is_empty() {
                return Err(StockError::InvalidInput(format!(
                    "cannot derive a part id from '{name}'"
                )));
            }
            if inventory.contains_key(&id) {
                return Err(StockError::collision(Entity::Part, id));
            }
            let part = Part::new(name, new.quantity)
                .with_purchase_url(non_blank(new.purchase_url))
                .with_type(non_blank(new.part_type));
            inventory.insert(id.clone(), part);
            Ok(id)
        });
        self.announce(result, |id| format!("Added part '{id}'"))
    }

    pub fn update_part(&mut self, id: &str, update: PartUpdate) -> StockResult<()> {
        let result = self.commit(|inventory, _, _| {
            let part =
                inventory.get_mut(id).ok_or_else(|| StockError::not_found(Entity::Part, id))?;
            if let Some(name) = update.name {
                let name = name.trim();
                if name.is_empty() {
                    return Err(StockError::InvalidInput("part name cannot be empty".to_string()));
                }
                part.name = name.to_string();
            }
            if let Some(quantity) = update.quantity {
                part.quantity = quantity;
            }
            if let Some(url) = update.purchase_url {
                part.purchase_url = non_blank(Some(url));
            }
            if let Some(part_type) = update.part_type {
                part.part_type = non_blank(Some(part_type));
            }
            Ok(())
        });
        self.announce(result, |_| format!("Updated part '{id}'"))
    }

    /// Move a part to a new id, carrying every BOM line that pointed at it.
    pub fn rename_part(&mut self, old_id: &str, new_id: &str) -> StockResult<()> {
        let new_id = new_id.trim();
        let result = self.commit(|inventory, projects, _| {
            if !inventory.contains_key(old_id) {
                return Err(StockError::not_found(Entity::Part, old_id));
            }
            if new_id.is_empty() {
                return Err(StockError::InvalidInput("new part id cannot be empty".to_string()));
            }
            if new_id == old_id {
                return Ok(());
            }
            if inventory.contains_key(new_id) {
                return Err(StockError::collision(Entity::Part, new_id));
            }

            if let Some(part) = inventory.remove(old_id) {
                inventory.insert(new_id.to_string(), part);
            }
            for project in projects.values_mut() {
                let Some(entry) = project.bom.remove(old_id) else {
                    continue;
                };
                let summed = match (&entry, project.bom.get_mut(new_id)) {
                    (BomEntry::Valid(moved), Some(BomEntry::Valid(existing))) => {
                        existing.quantity = existing.quantity.saturating_add(moved.quantity);
                        true
                    }
                    _ => false,
                };
                if !summed {
                    project.bom.insert(new_id.to_string(), entry);
                }
            }
            Ok(())
        });
        self.announce(result, |_| format!("Renamed part '{old_id}' to '{new_id}'"))
    }

    /// Remove a part. BOM lines that referenced it stay and report as missing.
    pub fn delete_part(&mut self, id: &str) -> StockResult<Part> {
        let result = self.commit(|inventory, _, _| {
            inventory.remove(id).ok_or_else(|| StockError::not_found(Entity::Part, id))
        });
        self.announce(result, |_| format!("Deleted part '{id}'"))
    }

    /// Add `delta` to a part's stock, clamping at zero. Returns the new quantity.
    pub fn adjust_quantity(&mut self, id: &str, delta: i64) -> StockResult<u32> {
        let result = self.commit(|inventory, _, _| {
            let part =
                inventory.get_mut(id).ok_or_else(|| StockError::not_found(Entity::Part, id))?;
            let updated = (i64::from(part.quantity) + delta).clamp(0, i64::from(u32::MAX));
            part.quantity = u32::try_from(updated).unwrap_or(u32::MAX);
            Ok(part.quantity)
        });
        self.announce(result, |qty| format!("'{id}' now has {qty} in stock"))
    }

    /// Create a project, optionally with an initial BOM. Returns its id.
    pub fn create_project(&mut self, new: NewProject) -> StockResult<String> {
        let result = self.commit(|inventory, projects, _| insert_project(inventory, projects, new));
        self.announce(result, |id| format!("Created project '{id}'"))
    }

    pub fn rename_project(&mut self, id: &str, name: &str) -> StockResult<()> {
        let result = self.commit(|_, projects, _| {
            let project =
                projects.get_mut(id).ok_or_else(|| StockError::not_found(Entity::Project, id))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(StockError::InvalidInput("project name cannot be empty".to_string()));
            }
            project.name = name.to_string();
            Ok(())
        });
        self.announce(result, |_| format!("Renamed project '{id}' to '{name}'"))
    }

    /// Remove a project and every part's reference to it.
    pub fn delete_project(&mut self, id: &str) -> StockResult<Project> {
        let result = self.commit(|inventory, projects, _| {
            let removed =
                projects.remove(id).ok_or_else(|| StockError::not_found(Entity::Project, id))?;
            for part in inventory.values_mut() {
                part.projects.remove(id);
            }
            Ok(removed)
        });
        self.announce(result, |_| format!("Deleted project '{id}'"))
    }

    /// Upsert a BOM line. A zero quantity removes the line.
    ///
    /// When `key` is an inventory id, the part's per-project quantity follows.
    pub fn set_bom_line(
        &mut self,
        project_id: &str,
        key: &str,
        name: Option<&str>,
        quantity: u32,
    ) -> StockResult<()> {
        let key = key.trim();
        let result = self.commit(|inventory, projects, _| {
            let project = projects
                .get_mut(project_id)
                .ok_or_else(|| StockError::not_found(Entity::Project, project_id))?;
            if key.is_empty() {
                return Err(StockError::InvalidInput("BOM key cannot be empty".to_string()));
            }

            if quantity == 0 {
                project.bom.remove(key);
            } else {
                let name = name
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .or_else(|| {
                        project.bom.get(key).and_then(BomEntry::as_valid).map(|l| l.name.clone())
                    })
                    .or_else(|| inventory.get(key).map(|p| p.name.clone()))
                    .unwrap_or_else(|| display_name_from_key(key));
                project.bom.insert(key.to_string(), BomEntry::Valid(BomLine::new(name, quantity)));
            }
            mirror_project_quantity(inventory, project_id, key, quantity);
            Ok(())
        });
        self.announce(result, |_| format!("Set '{key}' x{quantity} in '{project_id}'"))
    }

    pub fn remove_bom_line(&mut self, project_id: &str, key: &str) -> StockResult<BomEntry> {
        let result = self.commit(|inventory, projects, _| {
            let project = projects
                .get_mut(project_id)
                .ok_or_else(|| StockError::not_found(Entity::Project, project_id))?;
            let removed =
                project.bom.remove(key).ok_or_else(|| StockError::not_found(Entity::BomLine, key))?;
            mirror_project_quantity(inventory, project_id, key, 0);
            Ok(removed)
        });
        self.announce(result, |_| format!("Removed '{key}' from '{project_id}'"))
    }

    /// Import a JSON file in any of the accepted shapes, then merge duplicates.
    ///
    /// A snapshot replaces both records; a flat inventory replaces the
    /// inventory; a BOM-only file becomes a new project.
    pub fn import_json(&mut self, text: &str) -> StockResult<ImportOutcome> {
        let parsed = parse_json_import(text);
        let result = self.commit(|inventory, projects, policy| {
            let (import, read_report) = parsed?;
            let mut created_project = None;
            let kind = match import {
                JsonImport::Snapshot { inventory: new_inventory, projects: new_projects } => {
                    *inventory = new_inventory;
                    *projects = new_projects;
                    ImportKind::Snapshot
                }
                JsonImport::Inventory(new_inventory) => {
                    *inventory = new_inventory;
                    ImportKind::Inventory
                }
                JsonImport::Bom(bom) => {
                    let name = bom
                        .project_name
                        .clone()
                        .unwrap_or_else(|| IMPORTED_BOM_NAME.to_string());
                    let id = unique_project_id(&normalize(&name), projects);
                    let id = insert_bom_project(inventory, projects, policy, Some(id), &name, bom)?;
                    created_project = Some(id);
                    ImportKind::Bom
                }
            };
            cleanup(inventory, projects);
            let merge = repair_and_merge(inventory, projects, policy);
            Ok(ImportOutcome {
                kind,
                parts: inventory.len(),
                projects: projects.len(),
                dropped: read_report.total(),
                created_project,
                merge,
            })
        });
        self.announce(result, |outcome| {
            format!(
                "Imported {} parts and {} projects ({} merged)",
                outcome.parts, outcome.projects, outcome.merge.merges
            )
        })
    }

    /// Upsert inventory rows from a table, then merge duplicates. Project
    /// references to unknown projects are dropped.
    pub fn import_inventory_table(&mut self, text: &str) -> StockResult<TableImportOutcome> {
        let parsed = parse_inventory_table(text);
        let result = self.commit(|inventory, projects, policy| {
            let rows = parsed?;
            let summary = apply_inventory_rows(rows, inventory, projects, policy);
            cleanup(inventory, projects);
            let merge = repair_and_merge(inventory, projects, policy);
            Ok(TableImportOutcome { summary, merge })
        });
        self.announce(result, |outcome| {
            format!(
                "Imported inventory: {} created, {} updated",
                outcome.summary.created, outcome.summary.updated
            )
        })
    }

    /// Create a project from a BOM file. A blank `name` falls back to the
    /// file's own project name.
    pub fn create_project_from_bom(
        &mut self,
        name: &str,
        text: &str,
        format: BomFormat,
    ) -> StockResult<String> {
        let parsed = parse_bom(text, format);
        let result = self.commit(|inventory, projects, policy| {
            let bom = parsed?;
            let name = match name.trim() {
                "" => bom.project_name.clone().unwrap_or_else(|| IMPORTED_BOM_NAME.to_string()),
                given => given.to_string(),
            };
            let id = insert_bom_project(inventory, projects, policy, None, &name, bom)?;
            repair_and_merge(inventory, projects, policy);
            Ok(id)
        });
        self.announce(result, |id| format!("Created project '{id}' from BOM"))
    }

    pub fn merge_duplicates(&mut self) -> StockResult<MergeReport> {
        let result = self.commit(|inventory, projects, policy| {
            Ok(repair_and_merge(inventory, projects, policy))
        });
        self.announce(result, |report| format!("Merged {} duplicate parts", report.merges))
    }

    pub fn repair(&mut self) -> StockResult<RepairReport> {
        let result =
            self.commit(|inventory, projects, _| Ok(repair::repair(projects, inventory)));
        self.announce(result, |report| format!("Repaired {} BOM lines", report.repaired))
    }

    pub fn cleanup(&mut self) -> StockResult<CleanupReport> {
        let result = self.commit(|inventory, projects, _| Ok(cleanup(inventory, projects)));
        self.announce(result, |report| format!("Removed {} invalid entries", report.total()))
    }

    pub fn reconcile_project(&self, id: &str) -> StockResult<ProjectReport> {
        let project =
            self.projects.get(id).ok_or_else(|| StockError::not_found(Entity::Project, id))?;
        Ok(reconcile::reconcile(project, &self.inventory, &self.policy))
    }

    /// Requirements across all projects. Corrupted BOM lines are repaired
    /// (and persisted) first.
    pub fn aggregate_requirements(&mut self) -> StockResult<RequirementsReport> {
        if self.projects.values().any(Project::has_corrupted_lines) {
            self.repair()?;
        }
        Ok(reconcile::aggregate_requirements(&self.projects, &self.inventory))
    }

    pub fn export_json(&self) -> StockResult<String> {
        Ok(export_snapshot_json(&self.inventory, &self.projects)?)
    }

    pub fn export_inventory_table(&self) -> StockResult<String> {
        Ok(export_inventory_table(&self.inventory)?)
    }

    pub fn export_bom(
        &self,
        project_id: &str,
        format: BomFormat,
        exported_at: DateTime<Utc>,
    ) -> StockResult<String> {
        let project = self
            .projects
            .get(project_id)
            .ok_or_else(|| StockError::not_found(Entity::Project, project_id))?;
        let text = match format {
            BomFormat::Json => {
                export_bom_json(project, &self.inventory, &self.policy, exported_at)?
            }
            BomFormat::Table => export_bom_table(project, &self.inventory, &self.policy)?,
        };
        Ok(text)
    }
}

fn read_record<S: StateStore>(provider: &S, key: &str, kind: RecordKind) -> StockResult<Value> {
    match provider.get(key)? {
        Some(text) if !text.trim().is_empty() => codec::decode(kind, &text)
            .map_err(|source| StockError::Load { key: key.to_string(), source }),
        _ => Ok(Value::Object(Map::new())),
    }
}

fn encode_record<T: Serialize>(
    key: &str,
    kind: RecordKind,
    record: &T,
    threshold: usize,
) -> StockResult<String> {
    let to_encode_error = |source: CodecError| StockError::Encode { key: key.to_string(), source };
    let value = serde_json::to_value(record).map_err(|e| to_encode_error(e.into()))?;
    codec::encode(kind, &value, threshold).map_err(to_encode_error)
}

/// Merging moves BOM lines to canonical keys while repair needs the original
/// key of a damaged line, so damaged lines are repaired first.
fn repair_and_merge(
    inventory: &mut Inventory,
    projects: &mut Projects,
    policy: &MatchPolicy,
) -> MergeReport {
    if projects.values().any(Project::has_corrupted_lines) {
        repair::repair(projects, inventory);
    }
    merge::merge_duplicates(inventory, projects, policy)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Keep `part.projects[project_id]` in step with a BOM line keyed by an inventory id.
fn mirror_project_quantity(inventory: &mut Inventory, project_id: &str, key: &str, quantity: u32) {
    if let Some(part) = inventory.get_mut(key) {
        if quantity == 0 {
            part.projects.remove(project_id);
        } else {
            part.projects.insert(project_id.to_string(), quantity);
        }
    }
}

fn insert_project(
    inventory: &mut Inventory,
    projects: &mut Projects,
    new: NewProject,
) -> StockResult<String> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(StockError::InvalidInput("project name is required".to_string()));
    }
    let id = match new.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => normalize(name),
    };
    if id.is_empty() {
        return Err(StockError::InvalidInput(format!("cannot derive a project id from '{name}'")));
    }
    if projects.contains_key(&id) {
        return Err(StockError::collision(Entity::Project, id));
    }

    let project = Project { name: name.to_string(), bom: new.bom };
    for (key, line) in project.valid_lines() {
        if line.quantity > 0 {
            mirror_project_quantity(inventory, &id, key, line.quantity);
        }
    }
    projects.insert(id.clone(), project);
    Ok(id)
}

/// Create a project from an imported BOM, pointing each line at a matching
/// inventory part and filling in missing purchase links.
fn insert_bom_project(
    inventory: &mut Inventory,
    projects: &mut Projects,
    policy: &MatchPolicy,
    id: Option<String>,
    name: &str,
    bom: BomImport,
) -> StockResult<String> {
    let mut lines = Bom::new();
    for (key, entry) in bom.bom {
        let BomEntry::Valid(line) = entry else {
            continue;
        };
        let target =
            resolve_id(&key, Some(&line.name), inventory, policy).unwrap_or_else(|| key.clone());
        if let Some(url) = bom.purchase_urls.get(&key) {
            if let Some(part) = inventory.get_mut(&target).filter(|p| !p.has_purchase_url()) {
                part.purchase_url = Some(url.clone());
            }
        }
        match lines.get_mut(&target).and_then(BomEntry::as_valid_mut) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => {
                lines.insert(target, BomEntry::Valid(line));
            }
        }
    }
    if lines.is_empty() {
        return Err(TransferError::UnsupportedShape("BOM has no usable lines".to_string()).into());
    }
    insert_project(inventory, projects, NewProject { id, name: name.to_string(), bom: lines })
}

fn parse_bom(text: &str, format: BomFormat) -> Result<BomImport, TransferError> {
    match format {
        BomFormat::Table => parse_bom_table(text),
        BomFormat::Json => match parse_json_import(text)? {
            (JsonImport::Bom(bom), _) => Ok(bom),
            _ => Err(TransferError::UnsupportedShape(
                "expected a BOM file with a \"parts\" list".to_string(),
            )),
        },
    }
}

/// `base`, or `base-2`, `base-3`, ... when taken.
fn unique_project_id(base: &str, projects: &Projects) -> String {
    let base = if base.is_empty() { "imported" } else { base };
    if !projects.contains_key(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !projects.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}
