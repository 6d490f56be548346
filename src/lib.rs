//! Shared library for `NuPlanner`
//! Contains the curriculum catalog, student record, and the term planner
//! used by the `nuplanner` CLI.

pub mod core;
pub mod logger;

pub use crate::core::config;
pub use crate::core::get_version;
