//! Cache command handler

use crate::args::CacheSubcommand;
use nu_planner::config::Config;
use nu_planner::core::cache::{load_catalog, save_catalog};
use nu_planner::core::ingest::load_catalog_dir;
use nu_planner::core::models::Catalog;
use nu_planner::{error, info};
use std::path::{Path, PathBuf};

/// Dispatch cache subcommands
pub fn run(subcommand: CacheSubcommand, config: &Config, verbose: bool) -> Result<(), String> {
    match subcommand {
        CacheSubcommand::Build { dir } => build(dir, config, verbose),
        CacheSubcommand::Show => show(config),
    }
}

fn cache_path(config: &Config) -> Result<&Path, String> {
    if config.paths.cache_file.is_empty() {
        return Err(
            "✗ No cache_file configured (set it with `nuplanner config set cache_file PATH`)."
                .to_string(),
        );
    }
    Ok(Path::new(&config.paths.cache_file))
}

fn build(dir: Option<PathBuf>, config: &Config, verbose: bool) -> Result<(), String> {
    let dir = dir.unwrap_or_else(|| PathBuf::from(&config.paths.catalog_dir));
    let cache_file = cache_path(config)?;

    let catalog = load_catalog_dir(&dir).map_err(|e| {
        error!("Catalog ingestion failed for {}: {e}", dir.display());
        format!("✗ Failed to load catalog from {}: {e}", dir.display())
    })?;
    if verbose {
        println!("✓ Catalog loaded successfully from: {}", dir.display());
    }

    save_catalog(&catalog, cache_file).map_err(|e| {
        error!("Cache write failed for {}: {e}", cache_file.display());
        format!("✗ Failed to write cache {}: {e}", cache_file.display())
    })?;
    info!("Cache rebuilt at {}", cache_file.display());

    println!(
        "✓ Cached {} course(s), {} minor(s) at {}",
        catalog.len(),
        catalog.minors().len(),
        cache_file.display()
    );
    Ok(())
}

fn show(config: &Config) -> Result<(), String> {
    let cache_file = cache_path(config)?;
    let catalog = load_catalog(cache_file)
        .map_err(|e| format!("✗ Failed to read cache {}: {e}", cache_file.display()))?;

    println!("\n=== Catalog ({}) ===\n", cache_file.display());
    print!("{}", summarize(&catalog));
    Ok(())
}

fn summarize(catalog: &Catalog) -> String {
    let mut out = String::new();
    let offered = catalog
        .courses()
        .iter()
        .filter(|c| c.offered_this_term)
        .count();

    out.push_str(&format!(
        "Credits: {} required, {}-{} per term\n",
        catalog.credit_requirement(),
        catalog.min_credits_per_term(),
        catalog.max_credits_per_term()
    ));
    out.push_str(&format!(
        "Courses: {} ({offered} offered this term)\n",
        catalog.len()
    ));
    out.push_str(&format!("Minors: {}\n", catalog.minors().len()));
    for minor in catalog.minors() {
        out.push_str(&format!(
            "  - {} ({} course(s))\n",
            minor.name,
            minor.courses.len()
        ));
    }
    out.push_str(&format!(
        "General education: {} in group, {} pair(s)\n",
        catalog.general_education_group().len(),
        catalog.general_education_pairs().len()
    ));
    out.push_str(&format!(
        "Projects: {}, free electives: {}\n",
        catalog.project_modules().len(),
        catalog.free_elective_modules().len()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nu_planner::core::models::{CatalogBuilder, Course, Requirements};

    #[test]
    fn test_summarize_counts() {
        let mut closed = Course::new("B".to_string(), 4);
        closed.set_offered(false);
        let catalog = CatalogBuilder::new(Requirements {
            credit_requirement: 120,
            min_credits_per_term: 3,
            max_credits_per_term: 18,
        })
        .course(Course::new("A".to_string(), 3))
        .course(closed)
        .minor("Maths", &["A", "B"])
        .build()
        .unwrap();

        let text = summarize(&catalog);
        assert!(text.contains("120 required, 3-18 per term"));
        assert!(text.contains("Courses: 2 (1 offered this term)"));
        assert!(text.contains("  - Maths (2 course(s))"));
    }
}
