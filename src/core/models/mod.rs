//! Data models for `NuPlanner`

pub mod catalog;
pub mod course;
pub mod student;

pub use catalog::{Catalog, CatalogBuilder, Minor, Requirements};
pub use course::Course;
pub use student::{Grade, PlanningRequest, StudentRecord, MAX_TERMS_STUDIED, NO_MINOR};
