use anyhow::Result;
use partbin_core::model::StockStatus;

use crate::commands::open_workspace;

/// Per-line stock status of one project.
pub fn project_status_command(root: &str, project: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let report = ctx.store.reconcile_project(project)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Project: {}", report.project_name);
    for line in &report.lines {
        let matched = line
            .matched
            .as_ref()
            .map(|m| format!(" (matched {})", m.name))
            .unwrap_or_default();
        println!(
            "- [{}] {}: {}/{}{}",
            line.status.as_str(),
            line.name,
            line.have,
            line.need,
            matched
        );
    }
    println!(
        "Missing: {}, Low: {}, Sufficient: {}",
        report.missing_count, report.low_count, report.sufficient_count
    );
    if report.is_buildable() {
        println!("Ready to build.");
    }
    Ok(())
}

/// What all projects together need, most urgent first.
pub fn requirements_command(root: &str, json: bool) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    let report = ctx.store.aggregate_requirements()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.entries)?);
        return Ok(());
    }

    println!("Requirements:");
    if report.entries.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for entry in &report.entries {
        let breakdown = entry
            .breakdown
            .iter()
            .map(|need| format!("{} x{}", need.project_name, need.quantity))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "- [{}] {}: have {}, need {} ({})",
            entry.status.as_str(),
            entry.name,
            entry.inventory_qty,
            entry.total,
            breakdown
        );
    }
    println!(
        "Missing: {}, Low: {}, Sufficient: {}",
        report.count(StockStatus::Missing),
        report.count(StockStatus::Low),
        report.count(StockStatus::Sufficient)
    );
    Ok(())
}
