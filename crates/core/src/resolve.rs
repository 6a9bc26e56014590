//! Identity resolution: map a candidate id/name onto an existing inventory entry.
//!
//! Tiers, first hit wins:
//! 1. exact id
//! 2. normalized id equality
//! 3. fuzzy id match within the policy's edit-distance threshold
//! 4. normalized name equality, only when a candidate name is supplied
//!
//! The name tier serves imports that look parts up by name. Stock lookups
//! for BOM lines pass no name, so a line never borrows the stock of an
//! unrelated part that shares its display name.

use serde::Serialize;
use tracing::debug;

use crate::model::{Inventory, Part};
use crate::normalize::normalize;
use crate::policy::MatchPolicy;
use crate::similarity;

/// How a candidate was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MatchKind {
    Exact,
    Normalized,
    Fuzzy { distance: usize },
    Name,
}

impl MatchKind {
    pub fn is_exact(self) -> bool {
        matches!(self, MatchKind::Exact)
    }
}

/// A resolved inventory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub id: &'a str,
    pub part: &'a Part,
    pub kind: MatchKind,
}

/// Resolve `candidate_id` (and optionally `candidate_name`) against `inventory`.
///
/// Read-only: callers decide whether to create a part when this returns `None`.
pub fn resolve<'a>(
    candidate_id: &str,
    candidate_name: Option<&str>,
    inventory: &'a Inventory,
    policy: &MatchPolicy,
) -> Option<Match<'a>> {
    if let Some((id, part)) = inventory.get_key_value(candidate_id) {
        return Some(Match { id, part, kind: MatchKind::Exact });
    }

    let key = normalize(candidate_id);
    if !key.is_empty() {
        if let Some((id, part)) = find_by_normalized_id(&key, inventory) {
            return Some(Match { id, part, kind: MatchKind::Normalized });
        }

        let candidates = inventory.keys().map(|id| (id.as_str(), normalize(id)));
        if let Some((id, distance)) = similarity::closest(&key, candidates) {
            if distance <= policy.fuzzy_threshold {
                debug!(candidate = candidate_id, matched = id, distance, "fuzzy id match");
                let (id, part) = inventory.get_key_value(id)?;
                return Some(Match { id, part, kind: MatchKind::Fuzzy { distance } });
            }
        }
    }

    let name_key = candidate_name.map(normalize).filter(|k| !k.is_empty())?;
    find_by_normalized_name(&name_key, inventory)
        .map(|(id, part)| Match { id, part, kind: MatchKind::Name })
}

/// Id-only form of [`resolve`].
pub fn resolve_id(
    candidate_id: &str,
    candidate_name: Option<&str>,
    inventory: &Inventory,
    policy: &MatchPolicy,
) -> Option<String> {
    resolve(candidate_id, candidate_name, inventory, policy).map(|m| m.id.to_string())
}

/// First entry whose normalized id equals `key` (already normalized).
pub fn find_by_normalized_id<'a>(
    key: &str,
    inventory: &'a Inventory,
) -> Option<(&'a String, &'a Part)> {
    if key.is_empty() {
        return None;
    }
    inventory.iter().find(|(id, _)| normalize(id) == key)
}

/// First entry whose normalized name equals `key` (already normalized).
pub fn find_by_normalized_name<'a>(
    key: &str,
    inventory: &'a Inventory,
) -> Option<(&'a String, &'a Part)> {
    if key.is_empty() {
        return None;
    }
    inventory.iter().find(|(_, part)| normalize(&part.name) == key)
}
