//! Level-by-level discovery of asset files under the configured roots.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use storage::{StorageLocation, StorageResolver};

use crate::config::CompiledFilters;
use crate::error::Result;

/// Walks object storage with delimiter listings.
///
/// The root of a crawl is level 0. A directory at level `L` has its child
/// directories listed only while `L < depth`, so files up to `depth` levels
/// below the root are reachable. Directories matching an exclude pattern are
/// never listed. A directory holding a file that matches an include pattern
/// is a store: the file is taken as its asset and the store's internal
/// directories are not listed.
pub struct Crawler {
    resolver: Arc<StorageResolver>,
    filters: CompiledFilters,
    depth: usize,
    concurrency: usize,
}

impl Crawler {
    pub fn new(
        resolver: Arc<StorageResolver>,
        filters: CompiledFilters,
        depth: usize,
        concurrency: usize,
    ) -> Self {
        Self {
            resolver,
            filters,
            depth,
            concurrency: concurrency.max(1),
        }
    }

    /// Crawl every root in order. Returns sorted, de-duplicated asset locations.
    pub async fn crawl(&self, roots: &[String]) -> Result<Vec<String>> {
        let mut assets = BTreeSet::new();
        for root in roots {
            let found = self.crawl_root(root).await?;
            if found.is_empty() {
                warn!(root = %root, "No assets found under root");
            }
            assets.extend(found);
        }
        Ok(assets.into_iter().collect())
    }

    /// Crawl a single root location.
    #[instrument(skip(self), fields(depth = self.depth))]
    pub async fn crawl_root(&self, root: &str) -> Result<BTreeSet<String>> {
        let location = StorageLocation::parse(root)?;
        let storage = self.resolver.resolve(&location)?;

        let mut assets = BTreeSet::new();
        let mut frontier = vec![directory_key(location.key())];
        let mut level = 0;

        while !frontier.is_empty() {
            let listings: Vec<_> = stream::iter(frontier)
                .map(|prefix| {
                    let storage = storage.clone();
                    async move { storage.list_dir(&prefix).await }
                })
                .buffer_unordered(self.concurrency)
                .try_collect()
                .await?;

            let mut next = Vec::new();
            for listing in listings {
                let mut is_store = false;
                for file in listing.files {
                    let url = storage.url(&file);
                    if self.filters.is_asset(&url) {
                        is_store |= self.filters.ends_descent(&url);
                        assets.insert(url);
                    }
                }

                if is_store || level >= self.depth {
                    continue;
                }
                for dir in listing.directories {
                    if self.filters.is_excluded(&storage.url(&dir)) {
                        debug!(directory = %dir, "Skipping excluded directory");
                    } else {
                        next.push(dir);
                    }
                }
            }

            debug!(level, next = next.len(), assets = assets.len(), "Crawled level");
            frontier = next;
            level += 1;
        }

        info!(assets = assets.len(), "Crawled root");
        Ok(assets)
    }
}

/// Listing prefix for a key that names a directory.
fn directory_key(key: &str) -> String {
    if key.is_empty() || key.ends_with('/') {
        key.to_string()
    } else {
        format!("{}/", key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuilderSettings;
    use bytes::Bytes;
    use storage::ObjectStorage;

    async fn seeded(keys: &[&str]) -> Arc<StorageResolver> {
        let resolver = Arc::new(StorageResolver::default());
        let storage = Arc::new(ObjectStorage::in_memory());
        for key in keys {
            storage.put(key, Bytes::from_static(b"{}")).await.unwrap();
        }
        let loc = StorageLocation::parse("memory:///").unwrap();
        resolver.register(&loc, storage);
        resolver
    }

    fn crawler(resolver: Arc<StorageResolver>, settings: BuilderSettings) -> Crawler {
        let filters = settings.compile().unwrap();
        Crawler::new(resolver, filters, settings.depth, settings.list_concurrency)
    }

    #[test]
    fn test_directory_key() {
        assert_eq!(directory_key(""), "");
        assert_eq!(directory_key("era"), "era/");
        assert_eq!(directory_key("era/"), "era/");
    }

    #[tokio::test]
    async fn test_depth_limits_descent() {
        let resolver = seeded(&["root/a.nc", "root/one/b.nc", "root/one/two/c.nc"]).await;

        let shallow = crawler(
            resolver.clone(),
            BuilderSettings::new(vec!["memory:///root/".to_string()], 0),
        );
        assert_eq!(
            shallow.crawl(&["memory:///root/".to_string()]).await.unwrap(),
            vec!["memory:///root/a.nc"]
        );

        let deeper = crawler(
            resolver,
            BuilderSettings::new(vec!["memory:///root".to_string()], 1),
        );
        assert_eq!(
            deeper.crawl(&["memory:///root".to_string()]).await.unwrap(),
            vec!["memory:///root/a.nc", "memory:///root/one/b.nc"]
        );
    }

    #[tokio::test]
    async fn test_include_match_stops_descent() {
        let resolver = seeded(&[
            "root/net/stn.zarr/.zmetadata",
            "root/net/stn.zarr/grp/.zmetadata",
            "root/net/stn.zarr/grp/0.0",
            "root/net/other.zarr/.zmetadata",
        ])
        .await;

        let crawler = crawler(
            resolver,
            BuilderSettings::new(vec!["memory:///root/".to_string()], 3)
                .with_include_patterns(vec!["**/.zmetadata".to_string()]),
        );
        assert_eq!(
            crawler.crawl(&["memory:///root/".to_string()]).await.unwrap(),
            vec![
                "memory:///root/net/other.zarr/.zmetadata",
                "memory:///root/net/stn.zarr/.zmetadata",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_root_is_empty() {
        let resolver = seeded(&["root/a.nc"]).await;
        let crawler = crawler(
            resolver,
            BuilderSettings::new(vec!["memory:///nowhere/".to_string()], 3),
        );
        assert!(crawler
            .crawl(&["memory:///nowhere/".to_string()])
            .await
            .unwrap()
            .is_empty());
    }
}
