use std::fs;

use anyhow::{Context, Result};
use partbin_core::db::{save_workspace_config, StateDb, WorkspaceConfig, WorkspaceLayout};
use partbin_core::policy::MatchPolicy;
use serde::Serialize;

use crate::commands::open_workspace;
use crate::{canonicalize_or_current, infer_workspace_name};

#[derive(Serialize)]
pub struct WorkspaceInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub exports_dir: String,
    pub policy: MatchPolicy,
    pub compress_threshold: usize,
    pub parts: usize,
    pub projects: usize,
    pub total_stock: u64,
}

/// Initialize a new workspace at `root`.
pub fn init_workspace_command(
    root: &str,
    name: Option<String>,
    fuzzy_threshold: Option<usize>,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = WorkspaceLayout::new(&root_path);

    let workspace_name = match name {
        Some(n) => n,
        None => infer_workspace_name(&root_path),
    };

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.exports_dir).with_context(|| {
        format!("Failed to create exports dir: {}", layout.exports_dir.display())
    })?;

    let mut config = WorkspaceConfig::new(&workspace_name, layout.db_path_relative_string());
    if let Some(threshold) = fuzzy_threshold {
        config.policy = config.policy.with_fuzzy_threshold(threshold);
    }
    save_workspace_config(&layout, &config)?;

    // Create the database now so later commands can rely on it.
    StateDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize state database at {}", layout.db_path.display())
    })?;

    println!("Initialized partbin workspace:");
    println!("  Name: {}", workspace_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Exports dir: {}", layout.exports_dir.display());
    println!("  Fuzzy threshold: {}", config.policy.fuzzy_threshold);

    Ok(())
}

/// Show basic information about an existing workspace.
pub fn workspace_info_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let store = &ctx.store;
    let total_stock = store.inventory().values().map(|p| u64::from(p.quantity)).sum();

    if json {
        let snapshot = WorkspaceInfoSnapshot {
            name: ctx.config.name.clone(),
            root: ctx.layout.root.display().to_string(),
            config_file: ctx.layout.config_path.display().to_string(),
            config_version: ctx.config.config_version.clone(),
            db_path: ctx.db_path.display().to_string(),
            exports_dir: ctx.layout.exports_dir.display().to_string(),
            policy: ctx.config.policy.clone(),
            compress_threshold: ctx.config.compress_threshold,
            parts: store.inventory().len(),
            projects: store.projects().len(),
            total_stock,
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Workspace: {}", ctx.config.name);
    if let Some(desc) = &ctx.config.description {
        println!("  Description: {}", desc);
    }
    println!("  Root: {}", ctx.layout.root.display());
    println!("  Config: {}", ctx.layout.config_path.display());
    println!("  DB: {}", ctx.db_path.display());
    println!("  Fuzzy threshold: {}", ctx.config.policy.fuzzy_threshold);
    println!("  Parts: {} ({} in stock)", store.inventory().len(), total_stock);
    println!("  Projects: {}", store.projects().len());

    Ok(())
}
