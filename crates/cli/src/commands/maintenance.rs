use anyhow::Result;

use crate::commands::open_workspace;

pub fn merge_duplicates_command(root: &str, json: bool) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    let report = ctx.store.merge_duplicates()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.merges == 0 {
        println!("No duplicates found.");
    }
    for pair in &report.pairs {
        println!("- merged {} into {}", pair.duplicate, pair.canonical);
    }
    println!("BOM lines rewritten: {}", report.bom_lines_rewritten);
    Ok(())
}

pub fn repair_command(root: &str, json: bool) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    let report = ctx.store.repair()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Repaired {} BOM lines ({} recovered from inventory).",
        report.repaired, report.recovered_from_inventory
    );
    Ok(())
}

pub fn cleanup_command(root: &str, json: bool) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    let report = ctx.store.cleanup()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Malformed BOM lines removed: {}", report.malformed_lines);
    println!("Stale project references removed: {}", report.stale_references);
    Ok(())
}
