//! Crawl-then-parse catalog construction.

use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use asset_parser::AssetParser;
use storage::StorageResolver;

use crate::config::{BuilderSettings, CompiledFilters};
use crate::crawler::Crawler;
use crate::error::Result;
use crate::table::CatalogTable;

/// Discovers assets and turns them into a [`CatalogTable`].
pub struct Builder {
    settings: BuilderSettings,
    crawler: Crawler,
}

impl Builder {
    /// Validate the settings and compile their patterns.
    pub fn new(settings: BuilderSettings, resolver: Arc<StorageResolver>) -> Result<Self> {
        let filters: CompiledFilters = settings.compile()?;
        let crawler = Crawler::new(
            resolver,
            filters,
            settings.depth,
            settings.list_concurrency,
        );
        Ok(Self { settings, crawler })
    }

    pub fn settings(&self) -> &BuilderSettings {
        &self.settings
    }

    /// Crawl the roots and return every asset location.
    #[instrument(skip(self), fields(roots = self.settings.paths.len()))]
    pub async fn get_assets(&self) -> Result<Vec<String>> {
        let start = Instant::now();
        let assets = self.crawler.crawl(&self.settings.paths).await?;
        info!(
            assets = assets.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Asset discovery complete"
        );
        Ok(assets)
    }

    /// Crawl, then parse every asset with `parser`.
    pub async fn build<P: AssetParser>(&self, parser: &P) -> Result<CatalogTable<P::Record>> {
        let assets = self.get_assets().await?;
        Ok(parse_assets(parser, &assets))
    }
}

/// Parse each asset exactly once, in parallel, keeping input order.
pub fn parse_assets<P: AssetParser>(parser: &P, assets: &[String]) -> CatalogTable<P::Record> {
    let start = Instant::now();
    let outcomes: Vec<_> = assets.par_iter().map(|path| parser.parse(path)).collect();
    let table = CatalogTable::from_outcomes(outcomes);

    info!(
        parser = parser.name(),
        assets = assets.len(),
        records = table.len(),
        invalid = table.invalid_assets().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Parsed assets"
    );
    table
}
