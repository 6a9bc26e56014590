use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::db::{open_state_db, StateDb, WorkspaceConfig, WorkspaceLayout};
use crate::store::Store;

/// Layout, config, db path and a loaded store for one workspace.
#[derive(Debug)]
pub struct WorkspaceContext {
    pub layout: WorkspaceLayout,
    pub config: WorkspaceConfig,
    pub db_path: PathBuf,
    pub store: Store<StateDb>,
}

impl WorkspaceContext {
    /// Load the workspace config, open the database and load both records.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = WorkspaceLayout::new(root);
        let (config, db_path, db) = open_state_db(&layout)?;
        let store = Store::load_with(db, config.policy.clone(), config.compress_threshold)
            .with_context(|| format!("Failed to load workspace state from {}", db_path.display()))?;
        Ok(Self { layout, config, db_path, store })
    }
}
