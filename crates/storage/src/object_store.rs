//! Object storage interface for catalog crawling and export.

use bytes::Bytes;
use object_store::{
    aws::AmazonS3Builder, local::LocalFileSystem, memory::InMemory, path::Path, ObjectStore,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use tracing::{debug, instrument};

use catalog_common::{CatalogError, CatalogResult};

use crate::location::{Scheme, StorageLocation};

/// Configuration for S3 connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// AWS region of the buckets
    pub region: String,
    /// Custom endpoint (MinIO, localstack); AWS when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Send unsigned requests (public buckets)
    #[serde(default)]
    pub anonymous: bool,
    /// Allow plain HTTP endpoints
    #[serde(default)]
    pub allow_http: bool,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            anonymous: true,
            allow_http: false,
        }
    }
}

impl ObjectStorageConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            region: env::var("AWS_REGION").unwrap_or(defaults.region),
            endpoint: env::var("S3_ENDPOINT").ok(),
            access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            anonymous: env::var("S3_ANONYMOUS")
                .map(|v| v == "true")
                .unwrap_or(defaults.anonymous),
            allow_http: env::var("S3_ALLOW_HTTP")
                .map(|v| v == "true")
                .unwrap_or(defaults.allow_http),
        }
    }
}

/// Entries directly below a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Child directory keys, each ending in `/`
    pub directories: Vec<String>,
    /// Object keys
    pub files: Vec<String>,
}

/// Object storage client bound to one store.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    /// Location prefix of every key in this store, e.g. `s3://bucket/`
    base: String,
}

impl ObjectStorage {
    /// Create a client for the store that holds `location`.
    pub fn connect(location: &StorageLocation, config: &ObjectStorageConfig) -> CatalogResult<Self> {
        let store: Arc<dyn ObjectStore> = match location.scheme() {
            Scheme::S3 { bucket } => {
                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(bucket)
                    .with_region(&config.region);

                if let Some(endpoint) = &config.endpoint {
                    builder = builder.with_endpoint(endpoint);
                }
                if let (Some(key), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
                    builder = builder
                        .with_access_key_id(key)
                        .with_secret_access_key(secret);
                } else if config.anonymous {
                    builder = builder.with_skip_signature(true);
                }
                if config.allow_http {
                    builder = builder.with_allow_http(true);
                }

                let store = builder.build().map_err(|e| {
                    CatalogError::StorageError(format!("Failed to create S3 client: {}", e))
                })?;
                Arc::new(store)
            }
            Scheme::Memory => Arc::new(InMemory::new()),
            Scheme::Local => Arc::new(LocalFileSystem::new()),
        };

        Ok(Self {
            store,
            base: location.base().to_string(),
        })
    }

    /// Wrap an existing store.
    pub fn from_store(store: Arc<dyn ObjectStore>, base: impl Into<String>) -> Self {
        Self {
            store,
            base: base.into(),
        }
    }

    /// A fresh in-memory store addressed as `memory:///`.
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemory::new()), "memory:///")
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Full location string of a key.
    pub fn url(&self, key: &str) -> String {
        format!("{}{}", self.base, key)
    }

    /// Write bytes to a key.
    #[instrument(skip(self, data), fields(base = %self.base, key = %key))]
    pub async fn put(&self, key: &str, data: Bytes) -> CatalogResult<()> {
        let location = Path::from(key);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| CatalogError::StorageError(format!("Failed to write {}: {}", key, e)))?;

        Ok(())
    }

    /// Read bytes from a key.
    #[instrument(skip(self), fields(base = %self.base, key = %key))]
    pub async fn get(&self, key: &str) -> CatalogResult<Bytes> {
        let location = Path::from(key);

        let result = match self.store.get(&location).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(CatalogError::NotFound(self.url(key)))
            }
            Err(e) => {
                return Err(CatalogError::StorageError(format!(
                    "Failed to read {}: {}",
                    key, e
                )))
            }
        };

        let bytes = result
            .bytes()
            .await
            .map_err(|e| CatalogError::StorageError(format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Read object");
        Ok(bytes)
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> CatalogResult<bool> {
        let location = Path::from(key);

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(CatalogError::StorageError(format!(
                "Failed to check {}: {}",
                key, e
            ))),
        }
    }

    /// List every object below a prefix, recursively.
    pub async fn list(&self, prefix: &str) -> CatalogResult<Vec<String>> {
        use futures::TryStreamExt;

        let prefix_path = Path::from(prefix);
        let prefix_arg = if prefix_path.as_ref().is_empty() {
            None
        } else {
            Some(&prefix_path)
        };

        let mut keys = Vec::new();
        let mut stream = self.store.list(prefix_arg);
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| CatalogError::StorageError(format!("List failed: {}", e)))?
        {
            keys.push(meta.location.to_string());
        }

        keys.sort();
        Ok(keys)
    }

    /// List the directories and objects directly below a prefix.
    #[instrument(skip(self), fields(base = %self.base, prefix = %prefix))]
    pub async fn list_dir(&self, prefix: &str) -> CatalogResult<DirectoryListing> {
        let prefix_path = Path::from(prefix);
        let prefix_arg = if prefix_path.as_ref().is_empty() {
            None
        } else {
            Some(&prefix_path)
        };

        let result = self
            .store
            .list_with_delimiter(prefix_arg)
            .await
            .map_err(|e| {
                CatalogError::StorageError(format!("Failed to list {}: {}", prefix, e))
            })?;

        let mut listing = DirectoryListing {
            directories: result
                .common_prefixes
                .iter()
                .map(|p| format!("{}/", p))
                .collect(),
            files: result
                .objects
                .iter()
                .map(|meta| meta.location.to_string())
                .collect(),
        };
        listing.directories.sort();
        listing.files.sort();

        debug!(
            directories = listing.directories.len(),
            files = listing.files.len(),
            "Listed prefix"
        );
        Ok(listing)
    }

    /// Delete an object.
    #[instrument(skip(self), fields(base = %self.base, key = %key))]
    pub async fn delete(&self, key: &str) -> CatalogResult<()> {
        let location = Path::from(key);

        self.store
            .delete(&location)
            .await
            .map_err(|e| CatalogError::StorageError(format!("Failed to delete {}: {}", key, e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_exists() {
        let storage = ObjectStorage::in_memory();
        storage
            .put("catalogs/test.json", Bytes::from_static(b"{}"))
            .await
            .unwrap();

        assert!(storage.exists("catalogs/test.json").await.unwrap());
        assert!(!storage.exists("catalogs/missing.json").await.unwrap());
        assert_eq!(storage.get("catalogs/test.json").await.unwrap(), "{}");

        let err = storage.get("catalogs/missing.json").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_dir_splits_directories_and_files() {
        let storage = ObjectStorage::in_memory();
        for key in [
            "era/pv_utility/miroc6/historical/1hr/cf/d03/.zmetadata",
            "era/pv_utility/era5/reanalysis/1hr/cf/d03/.zmetadata",
            "era/README.txt",
        ] {
            storage.put(key, Bytes::from_static(b"x")).await.unwrap();
        }

        let top = storage.list_dir("era/").await.unwrap();
        assert_eq!(top.directories, vec!["era/pv_utility/"]);
        assert_eq!(top.files, vec!["era/README.txt"]);

        let sims = storage.list_dir("era/pv_utility/").await.unwrap();
        assert_eq!(
            sims.directories,
            vec!["era/pv_utility/era5/", "era/pv_utility/miroc6/"]
        );

        let root = storage.list_dir("").await.unwrap();
        assert_eq!(root.directories, vec!["era/"]);

        assert_eq!(storage.list("era/pv_utility").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_local_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let root = StorageLocation::parse(dir.path().to_str().unwrap()).unwrap();
        let storage = ObjectStorage::connect(&root, &ObjectStorageConfig::default()).unwrap();

        let key = root.join("out/catalog.csv");
        storage
            .put(key.key(), Bytes::from_static(b"path\n"))
            .await
            .unwrap();

        assert!(dir.path().join("out/catalog.csv").exists());
        assert_eq!(storage.url(key.key()), key.to_string());

        storage.delete(key.key()).await.unwrap();
        assert!(!storage.exists(key.key()).await.unwrap());
    }

    #[test]
    fn test_anonymous_s3_client() {
        let loc = StorageLocation::parse("s3://wfclimres/era/").unwrap();
        let storage = ObjectStorage::connect(&loc, &ObjectStorageConfig::default()).unwrap();
        assert_eq!(storage.base(), "s3://wfclimres/");
        assert_eq!(storage.url("era/x"), "s3://wfclimres/era/x");
    }
}
