//! partbin-core
//!
//! Core library for tracking component stock and project bills of materials
//! for guitar-pedal builds.
//!
//! The crate holds the data reconciliation engine (name normalization, fuzzy
//! matching, identity resolution, duplicate merging, BOM reconciliation and
//! repair), the import/export adapters, and the persisted store. Frontends
//! such as the CLI only read files, call into [`store::Store`], and print.

pub mod codec;
pub mod db;
pub mod error;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod policy;
pub mod reconcile;
pub mod repair;
pub mod resolve;
pub mod similarity;
pub mod store;
pub mod transfer;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
