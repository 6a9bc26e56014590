//! Workspace persistence: on-disk layout, JSON config and the SQLite state store.
//!
//! - `WorkspaceLayout`: computed paths for workspace directories/files.
//! - `WorkspaceConfig`: serializable workspace metadata and matching policy.
//! - `StateStore`: key/value persistence seam, with `StateDb` (SQLite, schema v1)
//!   and `MemoryStateStore`.
//! - `WorkspaceContext`: everything above opened for one root.

mod config;
mod context;
mod layout;
mod state_db;
mod util;

pub use config::{DbConfig, WorkspaceConfig};
pub use context::WorkspaceContext;
pub use layout::WorkspaceLayout;
pub use state_db::{
    current_schema_version, MemoryStateStore, StateDb, StateDbError, StateDbResult, StateStore,
    CURRENT_SCHEMA_VERSION,
};
pub use util::{load_workspace_config, open_state_db, save_workspace_config};
