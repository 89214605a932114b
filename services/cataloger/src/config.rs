//! Cataloger runtime configuration.

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use asset_parser::{HDP_ROOT, RENEWABLES_ROOT};
use catalog_builder::{BuilderSettings, ExportSettings};
use storage::ObjectStorageConfig;

/// Top-level cataloger configuration.
#[derive(Debug, Clone)]
pub struct CatalogerConfig {
    /// Object storage configuration
    pub storage: ObjectStorageConfig,

    pub logging: LoggingSettings,

    /// Every configured catalog, sorted by id
    pub catalogs: Vec<CatalogJob>,
}

impl CatalogerConfig {
    /// Load configuration from a config directory holding `cataloger.yaml`.
    pub fn from_yaml<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        use crate::config_loader;

        let all_configs = config_loader::load_all_configs(config_dir)?;
        all_configs.to_runtime_config()
    }

    /// Catalogs with `enabled: true`.
    pub fn enabled_catalogs(&self) -> impl Iterator<Item = &CatalogJob> {
        self.catalogs.iter().filter(|c| c.enabled)
    }

    pub fn catalog(&self, id: &str) -> Option<&CatalogJob> {
        self.catalogs.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Which path parser a catalog uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// WRF renewables generation stores
    Renewables,
    /// Historical Data Platform station stores
    Hdp,
}

impl ParserKind {
    /// Root prefix of the production collection.
    pub fn default_root(&self) -> &'static str {
        match self {
            ParserKind::Renewables => RENEWABLES_ROOT,
            ParserKind::Hdp => HDP_ROOT,
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserKind::Renewables => write!(f, "renewables"),
            ParserKind::Hdp => write!(f, "hdp"),
        }
    }
}

/// One catalog to build.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogJob {
    pub id: String,
    pub description: String,
    pub enabled: bool,
    pub parser: ParserKind,
    /// Prefix the parser strips; the collection's production bucket when unset
    pub asset_root: Option<String>,
    pub builder: BuilderSettings,
    pub export: ExportSettings,
    /// Public base URL the `catalog_file` key is pointed at after export
    pub publish_url: Option<String>,
}

impl CatalogJob {
    pub fn parser_root(&self) -> &str {
        self.asset_root
            .as_deref()
            .unwrap_or_else(|| self.parser.default_root())
    }

    /// Write the catalog somewhere else. Publishing is skipped for
    /// redirected output.
    pub fn redirect_output(&mut self, directory: &str) {
        self.export.directory = directory.to_string();
        self.publish_url = None;
    }
}
