//! Tunable matching heuristics.
//!
//! The defaults pin the behaviour users rely on today; they are stored in the
//! workspace config so a workspace can tighten or loosen them.

use serde::{Deserialize, Serialize};

/// Default maximum edit distance accepted as a fuzzy match.
pub const DEFAULT_FUZZY_THRESHOLD: usize = 2;

/// Part type treated as "unclassified" when merging duplicates.
pub const GENERIC_PART_TYPE: &str = "Other";

/// Heuristics used by the resolver and the duplicate merger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    /// Largest edit distance between normalized keys that still counts as a match.
    pub fuzzy_threshold: usize,
    /// When merging, let a later entry with a purchase link take over as the
    /// canonical record from one without.
    pub prefer_complete_records: bool,
    /// Type value that never overrides another type during a merge.
    pub generic_type: String,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            prefer_complete_records: true,
            generic_type: GENERIC_PART_TYPE.to_string(),
        }
    }
}

impl MatchPolicy {
    pub fn with_fuzzy_threshold(mut self, threshold: usize) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }
}
