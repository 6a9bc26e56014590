use anyhow::Result;
use clap::{Parser, Subcommand};
use partbin::commands::*;
use partbin_core::store::PartUpdate;
use tracing_subscriber::EnvFilter;

/// Component inventory and BOM tracker for pedal builds.
///
/// This CLI is a thin wrapper around `partbin-core` (exposed in code as
/// `partbin_core`). Reading and writing files happens here; every rule about
/// matching, merging and stock status lives in the library.
#[derive(Parser, Debug)]
#[command(
    name = "partbin",
    version,
    about = "Component inventory and BOM tracker for pedal builds",
    long_about = None
)]
struct Cli {
    /// Log matching and persistence decisions to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new workspace at the given root.
    ///
    /// Creates `.partbin/config.json`, `.partbin/state.db` and `exports/`.
    Init {
        /// Workspace root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional workspace name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,

        /// Largest edit distance accepted as a fuzzy match.
        #[arg(long)]
        fuzzy_threshold: Option<usize>,
    },

    /// Show workspace paths, settings and record counts.
    Info {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Add a part to the inventory.
    AddPart {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        name: String,

        /// Part id. Defaults to the normalized name.
        #[arg(long)]
        id: Option<String>,

        #[arg(long, default_value_t = 0)]
        quantity: u32,

        #[arg(long)]
        url: Option<String>,

        #[arg(long = "type")]
        part_type: Option<String>,
    },

    /// Change fields of an existing part. An empty --url or --type clears it.
    EditPart {
        #[arg(long, default_value = ".")]
        root: String,

        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        quantity: Option<u32>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long = "type")]
        part_type: Option<String>,
    },

    /// Move a part to a new id, updating BOM references.
    RenamePart {
        #[arg(long, default_value = ".")]
        root: String,

        id: String,

        new_id: String,
    },

    /// Remove a part. BOM lines that used it report as missing.
    DeletePart {
        #[arg(long, default_value = ".")]
        root: String,

        id: String,
    },

    /// Add to (or, with a negative delta, take from) a part's stock.
    Adjust {
        #[arg(long, default_value = ".")]
        root: String,

        id: String,

        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },

    /// List inventory parts.
    ListParts {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Find the part a name or id resolves to.
    Find {
        #[arg(long, default_value = ".")]
        root: String,

        query: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Create a project, optionally from a BOM file (.json or .csv).
    CreateProject {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value = "")]
        name: String,

        /// Project id. Defaults to the normalized name.
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        from_bom: Option<String>,
    },

    RenameProject {
        #[arg(long, default_value = ".")]
        root: String,

        id: String,

        name: String,
    },

    /// Delete a project and drop it from every part's project list.
    DeleteProject {
        #[arg(long, default_value = ".")]
        root: String,

        id: String,
    },

    ListProjects {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print one project's BOM.
    ShowProject {
        #[arg(long, default_value = ".")]
        root: String,

        id: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Set a BOM line's quantity. Zero removes the line.
    SetBomLine {
        #[arg(long, default_value = ".")]
        root: String,

        project: String,

        key: String,

        quantity: u32,

        #[arg(long)]
        name: Option<String>,
    },

    RemoveBomLine {
        #[arg(long, default_value = ".")]
        root: String,

        project: String,

        key: String,
    },

    /// Stock status of each line in a project's BOM.
    ProjectStatus {
        #[arg(long, default_value = ".")]
        root: String,

        project: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Combined requirements of every project against the inventory.
    Requirements {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Merge parts whose names normalize to the same key.
    MergeDuplicates {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Rewrite corrupted BOM lines from inventory data.
    Repair {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Drop malformed BOM lines and stale project references.
    Cleanup {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Import a JSON snapshot, legacy inventory, BOM file, or inventory CSV.
    Import {
        #[arg(long, default_value = ".")]
        root: String,

        path: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Export the workspace as JSON or the inventory as CSV.
    Export {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value = "json")]
        format: String,

        /// Output file. Defaults to a file under `exports/`.
        #[arg(long)]
        output: Option<String>,
    },

    /// Export one project's BOM as JSON or CSV.
    ExportBom {
        #[arg(long, default_value = ".")]
        root: String,

        project: String,

        #[arg(long, default_value = "csv")]
        format: String,

        #[arg(long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Init { root, name, fuzzy_threshold } => {
            init_workspace_command(&root, name, fuzzy_threshold)?
        }
        Command::Info { root, json } => workspace_info_command(&root, json)?,
        Command::AddPart { root, name, id, quantity, url, part_type } => {
            add_part_command(&root, &name, id, quantity, url, part_type)?
        }
        Command::EditPart { root, id, name, quantity, url, part_type } => {
            let update = PartUpdate { name, quantity, purchase_url: url, part_type };
            edit_part_command(&root, &id, update)?
        }
        Command::RenamePart { root, id, new_id } => rename_part_command(&root, &id, &new_id)?,
        Command::DeletePart { root, id } => delete_part_command(&root, &id)?,
        Command::Adjust { root, id, delta } => adjust_quantity_command(&root, &id, delta)?,
        Command::ListParts { root, json } => list_parts_command(&root, json)?,
        Command::Find { root, query, json } => find_part_command(&root, &query, json)?,
        Command::CreateProject { root, name, id, from_bom } => {
            create_project_command(&root, &name, id, from_bom.as_deref())?
        }
        Command::RenameProject { root, id, name } => rename_project_command(&root, &id, &name)?,
        Command::DeleteProject { root, id } => delete_project_command(&root, &id)?,
        Command::ListProjects { root, json } => list_projects_command(&root, json)?,
        Command::ShowProject { root, id, json } => show_project_command(&root, &id, json)?,
        Command::SetBomLine { root, project, key, quantity, name } => {
            set_bom_line_command(&root, &project, &key, name.as_deref(), quantity)?
        }
        Command::RemoveBomLine { root, project, key } => {
            remove_bom_line_command(&root, &project, &key)?
        }
        Command::ProjectStatus { root, project, json } => {
            project_status_command(&root, &project, json)?
        }
        Command::Requirements { root, json } => requirements_command(&root, json)?,
        Command::MergeDuplicates { root, json } => merge_duplicates_command(&root, json)?,
        Command::Repair { root, json } => repair_command(&root, json)?,
        Command::Cleanup { root, json } => cleanup_command(&root, json)?,
        Command::Import { root, path, json } => import_command(&root, &path, json)?,
        Command::Export { root, format, output } => {
            export_command(&root, &format, output.as_deref())?
        }
        Command::ExportBom { root, project, format, output } => {
            export_bom_command(&root, &project, &format, output.as_deref())?
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
