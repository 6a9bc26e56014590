use anyhow::{anyhow, Result};
use partbin_core::store::{NewPart, PartUpdate};
use serde::Serialize;

use crate::commands::open_workspace;

#[derive(Serialize)]
pub struct PartListing<'a> {
    pub id: &'a str,
    #[serde(flatten)]
    pub part: &'a partbin_core::model::Part,
}

pub fn add_part_command(
    root: &str,
    name: &str,
    id: Option<String>,
    quantity: u32,
    purchase_url: Option<String>,
    part_type: Option<String>,
) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    let new = NewPart { id, name: name.to_string(), quantity, purchase_url, part_type };
    let id = ctx.store.add_part(new)?;
    println!("{id}");
    Ok(())
}

pub fn edit_part_command(root: &str, id: &str, update: PartUpdate) -> Result<()> {
    if update.is_empty() {
        return Err(anyhow!(
            "Nothing to change; pass at least one of --name, --quantity, --url, --type"
        ));
    }
    let mut ctx = open_workspace(root)?;
    ctx.store.update_part(id, update)?;
    Ok(())
}

pub fn rename_part_command(root: &str, id: &str, new_id: &str) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    ctx.store.rename_part(id, new_id)?;
    Ok(())
}

pub fn delete_part_command(root: &str, id: &str) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    ctx.store.delete_part(id)?;
    Ok(())
}

/// Add or remove stock; prints the new quantity.
pub fn adjust_quantity_command(root: &str, id: &str, delta: i64) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    let quantity = ctx.store.adjust_quantity(id, delta)?;
    println!("{quantity}");
    Ok(())
}

pub fn list_parts_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let inventory = ctx.store.inventory();

    if json {
        let listing: Vec<_> =
            inventory.iter().map(|(id, part)| PartListing { id, part }).collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Parts:");
    if inventory.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for (id, part) in inventory {
        let part_type = part.part_type.as_deref().map(|t| format!(" [{t}]")).unwrap_or_default();
        println!("- {} ({}){}: {}", part.name, id, part_type, part.quantity);
    }
    Ok(())
}

/// Resolve a free-text query to a part the way BOM lines are resolved.
pub fn find_part_command(root: &str, query: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let found = ctx
        .store
        .find_part(query)
        .ok_or_else(|| anyhow!("No part matches '{}'", query))?;

    if json {
        #[derive(Serialize)]
        struct Found<'a> {
            id: &'a str,
            part: &'a partbin_core::model::Part,
            #[serde(rename = "match")]
            kind: partbin_core::resolve::MatchKind,
        }
        let found = Found { id: found.id, part: found.part, kind: found.kind };
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    println!("{} ({}): {} [{:?}]", found.part.name, found.id, found.part.quantity, found.kind);
    Ok(())
}
