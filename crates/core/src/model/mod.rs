//! Core data model: parts, projects, and BOM entries.
//!
//! The inventory and project mappings are the two persisted records. Both are
//! keyed by stable identifiers; normalized keys (see [`crate::normalize`]) are
//! derived on demand for matching and never stored in place of an id.

pub mod migrate;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub use migrate::{cleanup, inventory_from_value, projects_from_value, CleanupReport};

/// Inventory mapping: part id -> part. Iteration order is key order.
pub type Inventory = BTreeMap<String, Part>;

/// Project mapping: project id -> project.
pub type Projects = BTreeMap<String, Project>;

/// Bill of materials: part key (inventory id or external id) -> entry.
pub type Bom = BTreeMap<String, BomEntry>;

/// One inventory entry: a component type and its stock count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_url: Option<String>,
    /// Classification such as a capacitor dielectric ("Film", "MLCC", ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,
    /// Project id -> quantity this part contributes to that project.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub projects: BTreeMap<String, u32>,
}

impl Part {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self { name: name.into(), quantity, ..Self::default() }
    }

    pub fn with_purchase_url(mut self, url: Option<String>) -> Self {
        self.purchase_url = url;
        self
    }

    pub fn with_type(mut self, part_type: Option<String>) -> Self {
        self.part_type = part_type;
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>, quantity: u32) -> Self {
        self.projects.insert(project_id.into(), quantity);
        self
    }

    /// True when the part carries a non-blank purchase link.
    pub fn has_purchase_url(&self) -> bool {
        self.purchase_url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }
}

/// A named build with its own bill of materials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub bom: Bom,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), bom: Bom::new() }
    }

    /// Builder-style helper for inserting a valid line.
    pub fn with_line(mut self, key: impl Into<String>, line: BomLine) -> Self {
        self.bom.insert(key.into(), BomEntry::Valid(line));
        self
    }

    /// Iterate over the well-formed lines only.
    pub fn valid_lines(&self) -> impl Iterator<Item = (&String, &BomLine)> {
        self.bom.iter().filter_map(|(key, entry)| entry.as_valid().map(|line| (key, line)))
    }

    pub fn has_corrupted_lines(&self) -> bool {
        self.bom.values().any(|entry| matches!(entry, BomEntry::Corrupted(_)))
    }
}

/// A well-formed BOM line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomLine {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
}

impl BomLine {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self { name: name.into(), quantity }
    }
}

/// A BOM value as decoded from storage or an import.
///
/// Raw values are classified exactly once, at decode time, so the rest of the
/// crate never inspects ad hoc properties.
#[derive(Debug, Clone, PartialEq)]
pub enum BomEntry {
    /// Object with a name and a (coerced) quantity.
    Valid(BomLine),
    /// A stringified array that was later parsed back as an object, leaving
    /// character-indexed keys (`"0": "0"`, `"1": "["`, ...).
    Corrupted(Map<String, Value>),
    /// Anything that is not an object at all.
    Malformed(Value),
}

impl BomEntry {
    /// Classify a raw decoded value.
    pub fn classify(raw: Value) -> Self {
        match raw {
            Value::Object(map) if is_corruption_signature(&map) => BomEntry::Corrupted(map),
            Value::Object(map) => {
                let name = map.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
                let quantity = map.get("quantity").map(coerce_quantity).unwrap_or(0);
                BomEntry::Valid(BomLine { name, quantity })
            }
            other => BomEntry::Malformed(other),
        }
    }

    pub fn as_valid(&self) -> Option<&BomLine> {
        match self {
            BomEntry::Valid(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_valid_mut(&mut self) -> Option<&mut BomLine> {
        match self {
            BomEntry::Valid(line) => Some(line),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, BomEntry::Valid(_))
    }
}

impl From<BomLine> for BomEntry {
    fn from(line: BomLine) -> Self {
        BomEntry::Valid(line)
    }
}

impl Serialize for BomEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BomEntry::Valid(line) => line.serialize(serializer),
            BomEntry::Corrupted(raw) => raw.serialize(serializer),
            BomEntry::Malformed(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for BomEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(BomEntry::classify)
    }
}

fn is_corruption_signature(map: &Map<String, Value>) -> bool {
    map.get("0").and_then(Value::as_str) == Some("0")
        && map.get("1").and_then(Value::as_str) == Some("[")
}

/// Stock sufficiency of one requirement, ordered by display priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Missing,
    Low,
    Sufficient,
}

impl StockStatus {
    /// `Missing` when nothing is on hand, `Low` when short, otherwise `Sufficient`.
    pub fn assess(have: u32, need: u32) -> Self {
        if have == 0 {
            StockStatus::Missing
        } else if have < need {
            StockStatus::Low
        } else {
            StockStatus::Sufficient
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StockStatus::Missing => "missing",
            StockStatus::Low => "low",
            StockStatus::Sufficient => "sufficient",
        }
    }
}

/// Coerce a loosely-typed quantity into a non-negative count.
///
/// Numbers are truncated and clamped, numeric strings are parsed, anything
/// else counts as zero.
pub fn coerce_quantity(value: &Value) -> u32 {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u.min(u64::from(u32::MAX)) as u32
            } else if let Some(f) = n.as_f64() {
                if f.is_finite() && f > 0.0 {
                    f.min(f64::from(u32::MAX)) as u32
                } else {
                    0
                }
            } else {
                0
            }
        }
        Value::String(s) => parse_quantity(s).unwrap_or(0),
        _ => 0,
    }
}

/// Parse a textual quantity. Negative values clamp to zero; blank is zero.
pub fn parse_quantity(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n.clamp(0, i64::from(u32::MAX)) as u32);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// Title-cased display name derived from a slug-like key.
///
/// `"big-muff_pi"` becomes `"Big Muff Pi"`.
pub fn display_name_from_key(key: &str) -> String {
    key.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
