use anyhow::Result;
use chrono::Utc;
use partbin_core::transfer::BomFormat;

use crate::commands::{format_from_path, open_workspace, parse_format, read_input, write_export};

/// Import a JSON file (any accepted shape) or an inventory CSV.
pub fn import_command(root: &str, path: &str, json: bool) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    let text = read_input(path)?;

    match format_from_path(path)? {
        BomFormat::Json => {
            let outcome = ctx.store.import_json(&text)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("Parts: {}, Projects: {}", outcome.parts, outcome.projects);
                if let Some(id) = &outcome.created_project {
                    println!("Created project: {id}");
                }
                if outcome.dropped > 0 {
                    println!("Dropped invalid entries: {}", outcome.dropped);
                }
                println!("Duplicates merged: {}", outcome.merge.merges);
            }
        }
        BomFormat::Table => {
            let outcome = ctx.store.import_inventory_table(&text)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!(
                    "Created: {}, Updated: {}, Skipped: {}",
                    outcome.summary.created, outcome.summary.updated, outcome.summary.skipped
                );
                println!("Duplicates merged: {}", outcome.merge.merges);
            }
        }
    }
    Ok(())
}

/// Export the whole workspace (`json`) or the inventory table (`csv`).
pub fn export_command(root: &str, format: &str, output: Option<&str>) -> Result<()> {
    let ctx = open_workspace(root)?;
    let format = parse_format(format)?;
    let (text, default_name) = match format {
        BomFormat::Json => (ctx.store.export_json()?, "partbin-export.json"),
        BomFormat::Table => (ctx.store.export_inventory_table()?, "inventory.csv"),
    };
    let path = write_export(&ctx.layout, output, default_name, &text)?;
    println!("{}", path.display());
    Ok(())
}

/// Export one project's BOM.
pub fn export_bom_command(
    root: &str,
    project: &str,
    format: &str,
    output: Option<&str>,
) -> Result<()> {
    let ctx = open_workspace(root)?;
    let format = parse_format(format)?;
    let text = ctx.store.export_bom(project, format, Utc::now())?;
    let default_name = format!("{project}-bom.{}", format.extension());
    let path = write_export(&ctx.layout, output, &default_name, &text)?;
    println!("{}", path.display());
    Ok(())
}
