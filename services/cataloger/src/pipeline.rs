//! Build, clean, export and publish configured catalogs.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

use asset_parser::{AssetParser, HdpParser, RenewablesParser};
use catalog_builder::{save, update_catalog_file_key, Builder};
use storage::{ObjectStorageConfig, StorageResolver};

use crate::config::{CatalogJob, ParserKind};

/// Outcome of one catalog run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub id: String,
    /// Assets found by the crawl
    pub assets: usize,
    pub records: usize,
    pub invalid_assets: usize,
    pub duplicates_removed: usize,
    pub csv_location: String,
    pub json_location: String,
    /// Final value of the `catalog_file` key
    pub catalog_file: String,
}

/// Runs catalog jobs against a shared set of storage clients.
pub struct CatalogPipeline {
    resolver: Arc<StorageResolver>,
}

impl CatalogPipeline {
    pub fn new(storage: &ObjectStorageConfig) -> Self {
        Self::with_resolver(Arc::new(StorageResolver::new(storage.clone())))
    }

    pub fn with_resolver(resolver: Arc<StorageResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<StorageResolver> {
        &self.resolver
    }

    /// Run every job in order. Failed catalogs are logged and reported at the end.
    pub async fn run_all<'a>(
        &self,
        jobs: impl IntoIterator<Item = &'a CatalogJob>,
    ) -> Result<Vec<CatalogSummary>> {
        let mut summaries = Vec::new();
        let mut failed = Vec::new();

        for job in jobs {
            match self.run(job).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    error!(catalog = %job.id, error = %format!("{:#}", e), "Catalog build failed");
                    failed.push(job.id.clone());
                }
            }
        }

        anyhow::ensure!(
            failed.is_empty(),
            "{} catalog(s) failed: {}",
            failed.len(),
            failed.join(", ")
        );
        Ok(summaries)
    }

    /// Build, clean and save one catalog, then publish its catalog file.
    #[instrument(skip(self, job), fields(catalog = %job.id, parser = %job.parser))]
    pub async fn run(&self, job: &CatalogJob) -> Result<CatalogSummary> {
        match job.parser {
            ParserKind::Renewables => {
                self.run_with(job, &RenewablesParser::new(job.parser_root()))
                    .await
            }
            ParserKind::Hdp => self.run_with(job, &HdpParser::new(job.parser_root())).await,
        }
    }

    async fn run_with<P: AssetParser>(&self, job: &CatalogJob, parser: &P) -> Result<CatalogSummary> {
        let start = Instant::now();
        info!(roots = ?job.builder.paths, depth = job.builder.depth, "Building catalog");

        let builder = Builder::new(job.builder.clone(), self.resolver.clone())
            .with_context(|| format!("Invalid crawl settings for catalog '{}'", job.id))?;

        let mut table = builder
            .build(parser)
            .await
            .with_context(|| format!("Failed to build catalog '{}'", job.id))?;
        let assets = table.len() + table.invalid_assets().len();

        let report = table.clean();

        let exported = save(&table, &job.export, &self.resolver)
            .await
            .with_context(|| format!("Failed to save catalog '{}'", job.id))?;

        let catalog_file = match &job.publish_url {
            Some(https_url) => update_catalog_file_key(
                &job.export.directory,
                https_url,
                &job.export.name,
                &self.resolver,
            )
            .await
            .with_context(|| format!("Failed to publish catalog '{}'", job.id))?,
            None => exported.collection.catalog_file.clone(),
        };

        info!(
            assets,
            records = exported.rows,
            invalid = report.invalid_assets.len(),
            duplicates = report.duplicates_removed,
            catalog_file = %catalog_file,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Catalog complete"
        );

        Ok(CatalogSummary {
            id: job.id.clone(),
            assets,
            records: exported.rows,
            invalid_assets: report.invalid_assets.len(),
            duplicates_removed: report.duplicates_removed,
            csv_location: exported.csv_location,
            json_location: exported.json_location,
            catalog_file,
        })
    }
}

/// Parse paths without crawling; one JSON row per path, in input order.
pub fn parse_paths(
    kind: ParserKind,
    root: Option<&str>,
    paths: &[String],
) -> Result<Vec<serde_json::Value>> {
    let root = root.unwrap_or_else(|| kind.default_root());
    match kind {
        ParserKind::Renewables => outcomes_to_json(&RenewablesParser::new(root), paths),
        ParserKind::Hdp => outcomes_to_json(&HdpParser::new(root), paths),
    }
}

fn outcomes_to_json<P: AssetParser>(parser: &P, paths: &[String]) -> Result<Vec<serde_json::Value>> {
    paths
        .iter()
        .map(|path| serde_json::to_value(parser.parse(path)).context("Failed to serialize outcome"))
        .collect()
}
