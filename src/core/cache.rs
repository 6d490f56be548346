//! JSON snapshot of a constructed catalog
//!
//! Snapshots are written to a sibling temp file and renamed into place, so a
//! reader never observes a half-written cache. Loading goes back through
//! [`CatalogBuilder::build`] and therefore revalidates every reference.

use crate::core::error::CacheError;
use crate::core::models::{Catalog, CatalogBuilder};
use crate::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Snapshot layout version understood by this build
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    catalog: CatalogBuilder,
}

/// Write `catalog` to `path`
///
/// # Errors
/// Returns [`CacheError`] if the snapshot cannot be serialized or written.
pub fn save_catalog<P: AsRef<Path>>(catalog: &Catalog, path: P) -> Result<(), CacheError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let snapshot = Snapshot {
        version: CACHE_FORMAT_VERSION,
        catalog: catalog.to_builder(),
    };
    let json = serde_json::to_string_pretty(&snapshot)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    info!(
        "cache: wrote {} course(s) to {}",
        catalog.len(),
        path.display()
    );
    Ok(())
}

/// Read and revalidate the catalog stored at `path`
///
/// # Errors
/// Returns [`CacheError`] if the file is unreadable, was written by another
/// format version, or describes an invalid catalog.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, CacheError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&contents)?;
    if snapshot.version != CACHE_FORMAT_VERSION {
        return Err(CacheError::Version {
            found: snapshot.version,
            expected: CACHE_FORMAT_VERSION,
        });
    }

    let catalog = snapshot.catalog.build()?;
    debug!(
        "cache: loaded {} course(s) from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CatalogError;
    use crate::core::models::{Course, Requirements};
    use tempfile::TempDir;

    fn sample() -> Catalog {
        let mut lab = Course::new("LAB".to_string(), 1);
        lab.set_co_module("LEC".to_string());
        let mut lec = Course::new("LEC".to_string(), 3);
        lec.add_timeslot("MON1".to_string());
        lec.set_co_module("LAB".to_string());
        CatalogBuilder::new(Requirements {
            credit_requirement: 120,
            min_credits_per_term: 3,
            max_credits_per_term: 18,
        })
        .course(lec)
        .course(lab)
        .minor("Physics", &["LEC"])
        .general_education(&["LAB"])
        .build()
        .unwrap()
    }

    #[test]
    fn test_save_then_load_preserves_catalog() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("catalog.json");
        let catalog = sample();

        save_catalog(&catalog, &path).unwrap();
        assert!(path.exists());
        assert!(!tmp.path().join("nested").join("catalog.json.tmp").exists());

        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_version_mismatch() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        let snapshot = Snapshot {
            version: CACHE_FORMAT_VERSION + 1,
            catalog: sample().to_builder(),
        };
        fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, CacheError::Version { expected: CACHE_FORMAT_VERSION, .. }));
    }

    #[test]
    fn test_invalid_snapshot_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_catalog(&path), Err(CacheError::Json(_))));

        let mut builder = sample().to_builder();
        builder.project_modules.push("GHOST".to_string());
        let snapshot = Snapshot {
            version: CACHE_FORMAT_VERSION,
            catalog: builder,
        };
        fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        assert!(matches!(
            load_catalog(&path),
            Err(CacheError::Catalog(CatalogError::UnknownCourse { .. }))
        ));
    }

    #[test]
    fn test_zero_credit_snapshot_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");

        let mut builder = sample().to_builder();
        builder.courses[1].credits = 0;
        let snapshot = Snapshot {
            version: CACHE_FORMAT_VERSION,
            catalog: builder,
        };
        fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        assert!(matches!(
            load_catalog(&path),
            Err(CacheError::Catalog(CatalogError::ZeroCredits(id))) if id == "LAB"
        ));
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            load_catalog(tmp.path().join("absent.json")),
            Err(CacheError::Io(_))
        ));
    }
}
