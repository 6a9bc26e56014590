use std::path::{Path, PathBuf};

/// Logical layout of a parts workspace on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
/// The CLI is responsible for creating directories and files based on it.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    /// Root directory of the workspace.
    pub root: PathBuf,
    /// Directory for internal metadata (.partbin).
    pub meta_dir: PathBuf,
    /// Path to the workspace config file (JSON).
    pub config_path: PathBuf,
    /// Path to the state database file.
    pub db_path: PathBuf,
    /// Default directory for exported files.
    pub exports_dir: PathBuf,
}

impl WorkspaceLayout {
    /// Compute the default layout for a workspace rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".partbin");
        let config_path = meta_dir.join("config.json");
        let db_path = meta_dir.join("state.db");
        let exports_dir = root.join("exports");

        Self { root, meta_dir, config_path, db_path, exports_dir }
    }

    /// Database path suitable for storing in `WorkspaceConfig`, relative to
    /// `root` when possible.
    pub fn db_path_relative_string(&self) -> String {
        match self.db_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.db_path.to_string_lossy().to_string(),
        }
    }

    /// Path of an export file inside the exports directory.
    pub fn export_path(&self, file_name: &str) -> PathBuf {
        self.exports_dir.join(file_name)
    }
}
