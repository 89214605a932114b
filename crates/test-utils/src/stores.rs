//! In-memory object stores seeded with fixture keys.

use bytes::Bytes;
use object_store::memory::InMemory;
use std::sync::Arc;

use storage::{ObjectStorage, StorageLocation, StorageResolver};

/// Body written to every seeded object.
pub const SEEDED_BODY: &[u8] = b"{\"metadata\": {}, \"zarr_consolidated_format\": 1}";

/// An in-memory store addressed as the store of `location` (e.g. `s3://bucket/`),
/// holding `keys`.
pub async fn seeded_store(location: &str, keys: &[&str]) -> Arc<ObjectStorage> {
    let location = StorageLocation::parse(location).expect("valid fixture location");
    let storage = Arc::new(ObjectStorage::from_store(
        Arc::new(InMemory::new()),
        location.base(),
    ));
    for key in keys {
        storage
            .put(key, Bytes::from_static(SEEDED_BODY))
            .await
            .expect("seed in-memory store");
    }
    storage
}

/// A resolver whose store for `location` is a seeded in-memory store.
///
/// Other stores resolve as usual, so `memory:///` output directories work
/// alongside the seeded bucket.
pub async fn seeded_resolver(location: &str, keys: &[&str]) -> Arc<StorageResolver> {
    let resolver = Arc::new(StorageResolver::default());
    register_seeded(&resolver, location, keys).await;
    resolver
}

/// Register one more seeded store with an existing resolver.
pub async fn register_seeded(resolver: &StorageResolver, location: &str, keys: &[&str]) {
    let storage = seeded_store(location, keys).await;
    let location = StorageLocation::parse(location).expect("valid fixture location");
    resolver.register(&location, storage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::renewables;

    #[tokio::test]
    async fn test_seeded_store_urls_match_bucket() {
        let storage = seeded_store(renewables::BUCKET_URL, &renewables::STORE_KEYS).await;
        assert_eq!(storage.base(), "s3://wfclimres/");
        assert!(storage.exists(renewables::STORE_KEYS[0]).await.unwrap());
    }

    #[tokio::test]
    async fn test_seeded_resolver_serves_bucket() {
        let resolver = seeded_resolver(renewables::BUCKET_URL, &renewables::all_keys()).await;
        let root = StorageLocation::parse(renewables::ROOTS[0]).unwrap();
        let storage = resolver.resolve(&root).unwrap();
        let listing = storage.list_dir(root.key()).await.unwrap();
        assert_eq!(
            listing.directories,
            vec!["era/pv_distributed/EC-Earth3/", "era/pv_distributed/ec-earth3/", "era/pv_distributed/miroc6/"]
        );
    }
}
