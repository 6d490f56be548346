//! Process-wide handle to the current catalog
//!
//! Requests take an `Arc` snapshot and keep using it for their whole
//! lifetime. A rebuild swaps in a new catalog; requests already running keep
//! the snapshot they started with.

use crate::core::models::Catalog;
use crate::info;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared, swappable catalog
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogStore {
    /// Wrap an initial catalog
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Snapshot of the catalog in effect now
    ///
    /// The lock only guards an `Arc` swap, so a poisoned lock still holds a
    /// complete catalog and is read through.
    #[must_use]
    pub fn current(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install a rebuilt catalog and return the one it replaced
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let courses = catalog.len();
        let next = Arc::new(catalog);
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        info!("store: catalog replaced ({courses} course(s))");
        previous
    }
}
