//! Shares one client per store across all locations that use it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use catalog_common::CatalogResult;

use crate::location::StorageLocation;
use crate::object_store::{ObjectStorage, ObjectStorageConfig};

/// Hands out [`ObjectStorage`] clients keyed by store.
///
/// Crawling several roots of one bucket and writing the exported catalog
/// back into it all go through the same client. In-memory stores only
/// exist once they have been registered or first resolved.
pub struct StorageResolver {
    config: ObjectStorageConfig,
    stores: Mutex<HashMap<String, Arc<ObjectStorage>>>,
}

impl StorageResolver {
    pub fn new(config: ObjectStorageConfig) -> Self {
        Self {
            config,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Register a pre-built client for the store of `location`.
    pub fn register(&self, location: &StorageLocation, storage: Arc<ObjectStorage>) {
        let mut stores = self.stores.lock().unwrap_or_else(|e| e.into_inner());
        stores.insert(location.store_id(), storage);
    }

    /// Client for the store holding `location`, created on first use.
    pub fn resolve(&self, location: &StorageLocation) -> CatalogResult<Arc<ObjectStorage>> {
        let id = location.store_id();
        let mut stores = self.stores.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(storage) = stores.get(&id) {
            return Ok(storage.clone());
        }

        debug!(store = %id, "Creating storage client");
        let storage = Arc::new(ObjectStorage::connect(location, &self.config)?);
        stores.insert(id, storage.clone());
        Ok(storage)
    }

}

impl Default for StorageResolver {
    fn default() -> Self {
        Self::new(ObjectStorageConfig::default())
    }
}
