//! Core module: curriculum data, ingestion, caching, and planning

pub mod cache;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod planner;
pub mod store;

/// Returns the current version of the `NuPlanner` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
