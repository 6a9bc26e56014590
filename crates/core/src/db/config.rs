use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_COMPRESS_THRESHOLD;
use crate::policy::MatchPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Path to the state database file (typically relative to the workspace root).
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Serializable configuration describing a parts workspace.
///
/// Lives at `.partbin/config.json` in the workspace root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Human-friendly workspace name.
    pub name: String,
    pub description: Option<String>,
    /// Version of the config format.
    pub config_version: String,
    pub db: DbConfig,
    /// Matching thresholds used by the resolver and merger.
    #[serde(default)]
    pub policy: MatchPolicy,
    /// Persisted records larger than this many bytes are abbreviated.
    #[serde(default = "default_compress_threshold")]
    pub compress_threshold: usize,
}

fn default_compress_threshold() -> usize {
    DEFAULT_COMPRESS_THRESHOLD
}

impl WorkspaceConfig {
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            policy: MatchPolicy::default(),
            compress_threshold: DEFAULT_COMPRESS_THRESHOLD,
        }
    }
}
