//! Configuration loader for the cataloger
//!
//! Loads and validates YAML configuration files for:
//! - Global settings (cataloger.yaml)
//! - Catalog definitions (catalogs/*.yaml)
//!
//! Supports environment variable substitution using ${VAR} syntax.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use catalog_builder::{BuilderSettings, ExportSettings, DEFAULT_LIST_CONCURRENCY};
use catalog_common::{Aggregation, DataFormat};
use storage::ObjectStorageConfig;

use crate::config::{CatalogJob, CatalogerConfig, LoggingSettings, ParserKind};

// ============================================================================
// Global Configuration (cataloger.yaml)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Falls back to the environment when absent
    #[serde(default)]
    pub storage: Option<StorageConfig>,
    #[serde(default)]
    pub builder: BuilderDefaults,
    #[serde(default)]
    pub logging: LoggingSettings,
    pub catalogs: CatalogsLoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub region: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_true")]
    pub anonymous: bool,
    #[serde(default)]
    pub allow_http: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderDefaults {
    pub list_concurrency: usize,
}

impl Default for BuilderDefaults {
    fn default() -> Self {
        Self {
            list_concurrency: DEFAULT_LIST_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogsLoadConfig {
    /// Relative paths resolve against the config directory
    pub config_dir: String,
}

// ============================================================================
// Catalog Configuration (catalogs/*.yaml)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub catalog: CatalogMetadata,
    pub crawl: CrawlConfig,
    pub export: ExportConfig,
    #[serde(default)]
    pub publish: Option<PublishConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub id: String,
    /// File stem of the exported CSV and JSON
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub parser: ParserKind,
    #[serde(default)]
    pub asset_root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub root: Option<String>,
    /// Crawled as `<root>/<installation>/`
    #[serde(default)]
    pub installations: Vec<String>,
    pub depth: usize,
    #[serde(default)]
    pub include_patterns: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub list_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub directory: String,
    pub path_column: String,
    pub variable_column: String,
    pub data_format: DataFormat,
    pub groupby_attrs: Vec<String>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
    #[serde(default)]
    pub catalog_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    pub https_url: String,
}

// ============================================================================
// Aggregated Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct AllConfigs {
    pub global: GlobalConfig,
    pub catalogs: BTreeMap<String, CatalogConfig>,
}

// ============================================================================
// Loading Functions
// ============================================================================

/// Load and parse cataloger.yaml with environment variable substitution
pub fn load_global_config<P: AsRef<Path>>(path: P) -> Result<GlobalConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read cataloger config from {:?}", path.as_ref()))?;

    let expanded = expand_env_vars(&content)?;

    let config: GlobalConfig = serde_yaml::from_str(&expanded)
        .with_context(|| "Failed to parse cataloger config YAML")?;

    validate_global_config(&config)?;

    Ok(config)
}

/// Load and parse a catalog definition YAML file
pub fn load_catalog_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read catalog config from {:?}", path.as_ref()))?;

    let expanded = expand_env_vars(&content)?;

    let config: CatalogConfig = serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse catalog config from {:?}", path.as_ref()))?;

    validate_catalog_config(&config)
        .with_context(|| format!("Invalid catalog config {:?}", path.as_ref()))?;

    Ok(config)
}

/// Load all configuration files from a config directory
pub fn load_all_configs<P: AsRef<Path>>(config_dir: P) -> Result<AllConfigs> {
    let base = config_dir.as_ref();

    let global = load_global_config(base.join("cataloger.yaml"))?;

    // Resolve catalog configs directory (may be relative to config_dir)
    let catalogs_dir = if Path::new(&global.catalogs.config_dir).is_absolute() {
        PathBuf::from(&global.catalogs.config_dir)
    } else {
        base.join(&global.catalogs.config_dir)
    };
    let catalogs = load_catalog_configs(&catalogs_dir)?;

    Ok(AllConfigs { global, catalogs })
}

/// Load all catalog configs from a directory, keyed by catalog id
pub fn load_catalog_configs<P: AsRef<Path>>(
    catalogs_dir: P,
) -> Result<BTreeMap<String, CatalogConfig>> {
    let mut catalogs = BTreeMap::new();

    let entries = fs::read_dir(catalogs_dir.as_ref()).with_context(|| {
        format!("Failed to read catalogs directory {:?}", catalogs_dir.as_ref())
    })?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) == Some("yaml")
            || path.extension().and_then(|s| s.to_str()) == Some("yml")
        {
            let config = load_catalog_config(&path)?;
            let id = config.catalog.id.clone();
            anyhow::ensure!(
                !catalogs.contains_key(&id),
                "Duplicate catalog id '{}' in {:?}",
                id,
                path
            );
            catalogs.insert(id, config);
        }
    }

    Ok(catalogs)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content
/// Supports ${VAR} and ${VAR:-default} syntax
pub fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            let value = resolve_var_expr(&var_expr)?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_global_config(config: &GlobalConfig) -> Result<()> {
    if let Some(storage) = &config.storage {
        anyhow::ensure!(!storage.region.is_empty(), "Storage region cannot be empty");
    }

    anyhow::ensure!(
        config.builder.list_concurrency > 0,
        "builder.list_concurrency must be greater than 0"
    );

    // Validate logging level
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    anyhow::ensure!(
        valid_levels.contains(&config.logging.level.as_str()),
        "Invalid log level: {}. Must be one of: {:?}",
        config.logging.level,
        valid_levels
    );

    // Validate logging format
    let valid_formats = ["json", "pretty"];
    anyhow::ensure!(
        valid_formats.contains(&config.logging.format.as_str()),
        "Invalid log format: {}. Must be one of: {:?}",
        config.logging.format,
        valid_formats
    );

    anyhow::ensure!(
        !config.catalogs.config_dir.is_empty(),
        "catalogs.config_dir cannot be empty"
    );

    Ok(())
}

fn validate_catalog_config(config: &CatalogConfig) -> Result<()> {
    anyhow::ensure!(!config.catalog.id.is_empty(), "Catalog ID cannot be empty");
    anyhow::ensure!(
        !config.catalog.name.is_empty() && !config.catalog.name.contains('/'),
        "Catalog name '{}' must be non-empty and contain no '/'",
        config.catalog.name
    );

    // Validate crawl roots
    let crawl = &config.crawl;
    anyhow::ensure!(
        crawl.roots.is_empty() || crawl.root.is_none(),
        "crawl.roots and crawl.root are mutually exclusive"
    );
    anyhow::ensure!(
        crawl.installations.is_empty() || crawl.root.is_some(),
        "crawl.installations requires crawl.root"
    );
    anyhow::ensure!(
        !crawl_paths(crawl).is_empty(),
        "Catalog must have at least one crawl root"
    );
    if let Some(concurrency) = crawl.list_concurrency {
        anyhow::ensure!(concurrency > 0, "crawl.list_concurrency must be greater than 0");
    }

    // Validate patterns
    BuilderSettings::new(crawl_paths(crawl), crawl.depth)
        .with_include_patterns(crawl.include_patterns.clone())
        .with_exclude_patterns(crawl.exclude_patterns.clone())
        .compile()?;

    // Validate export columns
    let export = &config.export;
    anyhow::ensure!(!export.directory.is_empty(), "export.directory cannot be empty");
    anyhow::ensure!(!export.path_column.is_empty(), "export.path_column cannot be empty");
    anyhow::ensure!(
        !export.variable_column.is_empty(),
        "export.variable_column cannot be empty"
    );
    anyhow::ensure!(
        !export.groupby_attrs.is_empty(),
        "export.groupby_attrs must name at least one column"
    );

    if let Some(publish) = &config.publish {
        anyhow::ensure!(
            !publish.https_url.is_empty(),
            "publish.https_url cannot be empty"
        );
    }

    Ok(())
}

/// Crawl roots in order: explicit roots, or root + installations, or root.
fn crawl_paths(crawl: &CrawlConfig) -> Vec<String> {
    match &crawl.root {
        Some(root) if !crawl.installations.is_empty() => {
            let root = root.trim_end_matches('/');
            crawl
                .installations
                .iter()
                .map(|installation| format!("{}/{}/", root, installation))
                .collect()
        }
        Some(root) => vec![root.clone()],
        None => crawl.roots.clone(),
    }
}

// ============================================================================
// Conversion to Runtime Config
// ============================================================================

impl AllConfigs {
    /// Convert to runtime cataloger config
    pub fn to_runtime_config(&self) -> Result<CatalogerConfig> {
        let storage = match &self.global.storage {
            Some(storage) => {
                let env = ObjectStorageConfig::from_env();
                ObjectStorageConfig {
                    region: storage.region.clone(),
                    endpoint: storage.endpoint.clone().filter(|e| !e.is_empty()),
                    access_key_id: env.access_key_id,
                    secret_access_key: env.secret_access_key,
                    anonymous: storage.anonymous,
                    allow_http: storage.allow_http,
                }
            }
            None => ObjectStorageConfig::from_env(),
        };

        let catalogs = self
            .catalogs
            .values()
            .map(|cfg| convert_catalog_config(cfg, &self.global.builder))
            .collect();

        Ok(CatalogerConfig {
            storage,
            logging: self.global.logging.clone(),
            catalogs,
        })
    }
}

/// Convert a YAML catalog config to a runtime catalog job
pub fn convert_catalog_config(cfg: &CatalogConfig, defaults: &BuilderDefaults) -> CatalogJob {
    let mut builder = BuilderSettings::new(crawl_paths(&cfg.crawl), cfg.crawl.depth)
        .with_include_patterns(cfg.crawl.include_patterns.clone())
        .with_exclude_patterns(cfg.crawl.exclude_patterns.clone());
    builder.list_concurrency = cfg
        .crawl
        .list_concurrency
        .unwrap_or(defaults.list_concurrency);

    let export = ExportSettings {
        name: cfg.catalog.name.clone(),
        directory: cfg.export.directory.clone(),
        path_column: cfg.export.path_column.clone(),
        variable_column: cfg.export.variable_column.clone(),
        data_format: cfg.export.data_format,
        groupby_attrs: cfg.export.groupby_attrs.clone(),
        aggregations: cfg.export.aggregations.clone(),
        description: cfg.catalog.description.clone(),
        catalog_file: cfg.export.catalog_file.clone(),
    };

    CatalogJob {
        id: cfg.catalog.id.clone(),
        description: cfg.catalog.description.clone(),
        enabled: cfg.catalog.enabled,
        parser: cfg.catalog.parser,
        asset_root: cfg.catalog.asset_root.clone(),
        builder,
        export,
        publish_url: cfg.publish.as_ref().map(|p| p.https_url.clone()),
    }
}

// ============================================================================
// Tests
// ============================================================================
