use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use partbin_core::db::{WorkspaceContext, WorkspaceLayout};
use partbin_core::transfer::BomFormat;

use crate::{canonicalize_or_current, ConsoleNotifier};

/// Open the workspace at `root` with console notices attached.
pub fn open_workspace(root: &str) -> Result<WorkspaceContext> {
    let root_path = canonicalize_or_current(root)?;
    let mut ctx = WorkspaceContext::from_root(&root_path)?;
    ctx.store.set_notifier(ConsoleNotifier);
    Ok(ctx)
}

/// Read an import file as text.
pub fn read_input(path: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read input file {path}"))
}

/// Parse a `--format` value.
pub fn parse_format(format: &str) -> Result<BomFormat> {
    BomFormat::from_extension(format)
        .ok_or_else(|| anyhow!("Invalid format '{}'. Allowed: json, csv", format))
}

/// Format implied by a file name's extension.
pub fn format_from_path(path: &str) -> Result<BomFormat> {
    let ext = Path::new(path).extension().and_then(|e| e.to_str()).unwrap_or_default();
    BomFormat::from_extension(ext)
        .ok_or_else(|| anyhow!("Cannot infer format from '{}'; use a .json or .csv file", path))
}

/// Write export text to `output`, or to `exports/<default_name>` when omitted.
/// Returns the path written.
pub fn write_export(
    layout: &WorkspaceLayout,
    output: Option<&str>,
    default_name: &str,
    contents: &str,
) -> Result<PathBuf> {
    let path = match output {
        Some(p) => PathBuf::from(p),
        None => {
            fs::create_dir_all(&layout.exports_dir).with_context(|| {
                format!("Failed to create exports dir: {}", layout.exports_dir.display())
            })?;
            layout.export_path(default_name)
        }
    };
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    Ok(path)
}
