//! CLI command handlers for `NuPlanner`.
//!
//! Each command is implemented in its own submodule. Handlers report
//! failures as `✗`-prefixed strings; `main` prints them and sets the exit code.

pub mod cache;
pub mod config;
pub mod plan;

use crate::args::StudentArgs;
use nu_planner::config::Config;
use nu_planner::core::cache::load_catalog;
use nu_planner::core::ingest::{load_catalog_dir, parse_grade_entry, parse_grades_csv};
use nu_planner::core::models::{Catalog, PlanningRequest};
use nu_planner::{debug, error, info};
use std::path::Path;

/// Load the catalog for a planning command
///
/// The cache snapshot is preferred. Without one, the sheets in `catalog_dir`
/// are ingested directly.
pub fn current_catalog(config: &Config) -> Result<Catalog, String> {
    let cache_file = Path::new(&config.paths.cache_file);
    if !config.paths.cache_file.is_empty() && cache_file.exists() {
        return load_catalog(cache_file).map_err(|e| {
            error!("Failed to load cache {}: {e}", cache_file.display());
            format!(
                "✗ Failed to load catalog cache {}: {e}\n  Rebuild it with `nuplanner cache build`.",
                cache_file.display()
            )
        });
    }

    if config.paths.catalog_dir.is_empty() {
        return Err("✗ No catalog cache found and no catalog_dir configured.".to_string());
    }
    let dir = Path::new(&config.paths.catalog_dir);
    info!(
        "No cache at {}; reading sheets from {}",
        cache_file.display(),
        dir.display()
    );
    load_catalog_dir(dir).map_err(|e| {
        error!("Failed to ingest {}: {e}", dir.display());
        format!("✗ Failed to load catalog from {}: {e}", dir.display())
    })
}

/// Assemble a planning request from the student flags
///
/// Grades from `--grades` come first so individual `--grade` flags override them.
pub fn planning_request(student: &StudentArgs) -> Result<PlanningRequest, String> {
    let mut request = PlanningRequest::new(student.terms_studied);
    request.minor.clone_from(&student.minor);

    if let Some(path) = &student.grades {
        let grades = parse_grades_csv(path)
            .map_err(|e| format!("✗ Failed to read grades from {}: {e}", path.display()))?;
        debug!("Read {} grade(s) from {}", grades.len(), path.display());
        request.grades.extend(grades);
    }
    for raw in &student.grade {
        request
            .grades
            .push(parse_grade_entry(raw).map_err(|e| format!("✗ {e}"))?);
    }
    Ok(request)
}
