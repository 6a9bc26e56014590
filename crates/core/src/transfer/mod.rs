//! Import and export adapters.
//!
//! Everything here works on complete in-memory text; reading and writing
//! files is the caller's job.

pub mod export;
pub mod import;
pub mod tabular;

use thiserror::Error;

pub use export::{
    export_bom_json, export_bom_table, export_inventory_table, export_snapshot_json,
    format_project_quantities, BomExport, BomExportPart, BOM_HEADERS, INVENTORY_HEADERS,
};
pub use import::{
    apply_inventory_rows, parse_bom_table, parse_inventory_table, parse_json_import,
    parse_project_quantities, BomImport, InventoryImportSummary, JsonImport, PartRow,
};
pub use tabular::{parse_table, write_table, Table, TabularRecord};

/// Failure to read or produce an exchange format.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid table at line {line}: {message}")]
    Table { line: u64, message: String },

    #[error("Table has no header row")]
    MissingHeader,

    #[error("Table is missing a required column: {0}")]
    MissingColumn(&'static str),

    #[error("Unrecognized import format: {0}")]
    UnsupportedShape(String),

    #[error("Row at line {line}: {message}")]
    Row { line: u64, message: String },

    #[error("Failed to write table: {0}")]
    Write(String),
}

/// Exchange format for per-project BOM files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BomFormat {
    Json,
    Table,
}

impl BomFormat {
    /// Guess the format from a file extension (`json`, `csv`, `tsv`, `txt`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(BomFormat::Json),
            "csv" | "tsv" | "txt" => Some(BomFormat::Table),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            BomFormat::Json => "json",
            BomFormat::Table => "csv",
        }
    }
}
