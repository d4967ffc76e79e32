//! `netrecon-core`: reconciliation engine for radio-network configuration
//! exports.
//!
//! Pure engine crate: receives tables, returns pooled, indexed and merged
//! records. File formats live in `netrecon-io`, the command surface in
//! `netrecon-cli`.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod ingest;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod report;
pub mod resolver;
pub mod search;
pub mod views;

pub use config::ReconConfig;
pub use engine::Engine;
pub use error::ReconError;
pub use ingest::{LoadStats, TableReader};
pub use model::{Match, MatchSet, MergedRecord, Record, Table, Technology};
pub use normalize::clean;
pub use report::{ChangeRequestRow, ReportSheet};
pub use resolver::Resolver;
pub use views::ParameterView;
