use anyhow::Result;
use partbin_core::model::Project;
use partbin_core::store::NewProject;
use serde::Serialize;

use crate::commands::{format_from_path, open_workspace, read_input};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListing<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub lines: usize,
    pub corrupted_lines: bool,
}

/// Create a project, empty or from a BOM file (`.json` or `.csv`).
pub fn create_project_command(
    root: &str,
    name: &str,
    id: Option<String>,
    from_bom: Option<&str>,
) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    let id = match from_bom {
        Some(path) => {
            let format = format_from_path(path)?;
            let text = read_input(path)?;
            ctx.store.create_project_from_bom(name, &text, format)?
        }
        None => {
            let new = NewProject { id, name: name.to_string(), ..Default::default() };
            ctx.store.create_project(new)?
        }
    };
    println!("{id}");
    Ok(())
}

pub fn rename_project_command(root: &str, id: &str, name: &str) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    ctx.store.rename_project(id, name)?;
    Ok(())
}

pub fn delete_project_command(root: &str, id: &str) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    ctx.store.delete_project(id)?;
    Ok(())
}

/// Set a BOM line's quantity; zero removes the line.
pub fn set_bom_line_command(
    root: &str,
    project: &str,
    key: &str,
    name: Option<&str>,
    quantity: u32,
) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    ctx.store.set_bom_line(project, key, name, quantity)?;
    Ok(())
}

pub fn remove_bom_line_command(root: &str, project: &str, key: &str) -> Result<()> {
    let mut ctx = open_workspace(root)?;
    ctx.store.remove_bom_line(project, key)?;
    Ok(())
}

pub fn list_projects_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let projects = ctx.store.projects();

    if json {
        let listing: Vec<_> = projects
            .iter()
            .map(|(id, project)| ProjectListing {
                id,
                name: &project.name,
                lines: project.bom.len(),
                corrupted_lines: project.has_corrupted_lines(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Projects:");
    if projects.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for (id, project) in projects {
        println!("- {} ({}): {} BOM lines", project.name, id, project.bom.len());
    }
    Ok(())
}

/// Print one project's BOM.
pub fn show_project_command(root: &str, id: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let project: &Project = ctx
        .store
        .project(id)
        .ok_or_else(|| anyhow::anyhow!("Project '{}' not found", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(project)?);
        return Ok(());
    }

    println!("{} ({})", project.name, id);
    if project.bom.is_empty() {
        println!("(empty BOM)");
    }
    for (key, entry) in &project.bom {
        match entry.as_valid() {
            Some(line) => println!("- {} ({}): {}", line.name, key, line.quantity),
            None => println!("- {} (unreadable; run `partbin repair`)", key),
        }
    }
    Ok(())
}
