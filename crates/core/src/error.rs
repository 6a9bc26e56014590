//! Structured errors raised by store operations.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::codec::CodecError;
use crate::db::StateDbError;
use crate::transfer::TransferError;

/// What kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Part,
    Project,
    BomLine,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Part => "Part",
            Entity::Project => "Project",
            Entity::BomLine => "BOM line",
        })
    }
}

/// Coarse classification for callers that branch on the failure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    IdCollision,
    NotFound,
    InvalidInput,
    Import,
    Load,
    Storage,
}

#[derive(Debug, Error)]
pub enum StockError {
    /// A new or renamed id is already taken. Nothing was changed.
    #[error("{entity} id '{id}' already exists")]
    IdCollision { entity: Entity, id: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: Entity, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Import text could not be parsed; nothing was committed.
    #[error("Import failed: {0}")]
    Import(#[from] TransferError),

    /// A persisted record could not be decoded, even as plain JSON.
    #[error("Failed to load persisted {key}: {source}")]
    Load {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("Failed to encode {key} for storage: {source}")]
    Encode {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error(transparent)]
    Storage(#[from] StateDbError),
}

impl StockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StockError::IdCollision { .. } => ErrorKind::IdCollision,
            StockError::NotFound { .. } => ErrorKind::NotFound,
            StockError::InvalidInput(_) => ErrorKind::InvalidInput,
            StockError::Import(_) => ErrorKind::Import,
            StockError::Load { .. } => ErrorKind::Load,
            StockError::Encode { .. } | StockError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        StockError::NotFound { entity, id: id.into() }
    }

    pub(crate) fn collision(entity: Entity, id: impl Into<String>) -> Self {
        StockError::IdCollision { entity, id: id.into() }
    }
}

pub type StockResult<T> = Result<T, StockError>;
