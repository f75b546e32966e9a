//! Catalog lookup
//!
//! The ledger freezes name, price and expense from the catalog when an item
//! is created. Menu management lives elsewhere; this service only serves
//! lookups from an in-memory cache loaded at startup.

use parking_lot::RwLock;
use shared::order::{CatalogEntry, CatalogRef};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Resolves catalog references to their current entry
pub trait CatalogLookup: Send + Sync {
    fn lookup(&self, catalog: &CatalogRef) -> Option<CatalogEntry>;
}

/// Catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: Arc<RwLock<HashMap<CatalogRef, CatalogEntry>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let catalog = Self::new();
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    /// Load a JSON array of catalog entries
    ///
    /// A missing file yields an empty catalog so a fresh install still boots.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Catalog file not found, starting with an empty catalog"
            );
            return Ok(Self::new());
        }

        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)?;
        let catalog = Self::from_entries(entries);
        tracing::info!(path = %path.display(), entries = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Insert or replace an entry
    pub fn insert(&self, entry: CatalogEntry) {
        self.entries.write().insert(entry.catalog.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn lookup(&self, catalog: &CatalogRef) -> Option<CatalogEntry> {
        self.entries.read().get(catalog).cloned()
    }
}
