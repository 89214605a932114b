//! Crawl and export settings.

use serde::{Deserialize, Serialize};

use catalog_common::{Aggregation, DataFormat};

use crate::error::{BuilderError, Result};
use crate::glob::{compile_all, GlobPattern};

/// Default number of directory listings in flight at once.
pub const DEFAULT_LIST_CONCURRENCY: usize = 16;

/// Where and how deep to crawl for assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderSettings {
    /// Root locations, crawled in order
    pub paths: Vec<String>,
    /// Directory levels to descend below each root
    pub depth: usize,
    /// Locations (files or directories) matching any of these are skipped
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    /// When non-empty, only files matching one of these are assets
    #[serde(default)]
    pub include_patterns: Vec<String>,
    #[serde(default = "default_list_concurrency")]
    pub list_concurrency: usize,
}

fn default_list_concurrency() -> usize {
    DEFAULT_LIST_CONCURRENCY
}

impl BuilderSettings {
    pub fn new(paths: Vec<String>, depth: usize) -> Self {
        Self {
            paths,
            depth,
            exclude_patterns: Vec::new(),
            include_patterns: Vec::new(),
            list_concurrency: DEFAULT_LIST_CONCURRENCY,
        }
    }

    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns = patterns;
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Check the settings and compile the patterns.
    pub fn compile(&self) -> Result<CompiledFilters> {
        if self.paths.is_empty() {
            return Err(BuilderError::InvalidSettings(
                "at least one root path is required".to_string(),
            ));
        }
        if self.list_concurrency == 0 {
            return Err(BuilderError::InvalidSettings(
                "list_concurrency must be greater than 0".to_string(),
            ));
        }

        Ok(CompiledFilters {
            include: compile_all(&self.include_patterns)?,
            exclude: compile_all(&self.exclude_patterns)?,
        })
    }
}

/// Compiled include/exclude patterns.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    include: Vec<GlobPattern>,
    exclude: Vec<GlobPattern>,
}

impl CompiledFilters {
    pub fn is_excluded(&self, location: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(location))
    }

    /// Whether a file location is an asset.
    pub fn is_asset(&self, location: &str) -> bool {
        if self.is_excluded(location) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches(location))
    }

    /// Whether a file ends descent into its directory. Only files matching
    /// an include pattern do; without include patterns depth alone applies.
    pub fn ends_descent(&self, location: &str) -> bool {
        !self.include.is_empty() && self.is_asset(location)
    }
}

/// How to write the catalog files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// File stem of `<name>.csv` and `<name>.json`, also the collection id
    pub name: String,
    /// Target directory location
    pub directory: String,
    pub path_column: String,
    pub variable_column: String,
    pub data_format: DataFormat,
    pub groupby_attrs: Vec<String>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
    #[serde(default)]
    pub description: String,
    /// Value for the `catalog_file` key; defaults to `<directory>/<name>.csv`
    #[serde(default)]
    pub catalog_file: Option<String>,
}

impl ExportSettings {
    /// Check the settings against the columns of the records being exported.
    pub fn validate(&self, columns: &[&str]) -> Result<()> {
        if self.name.is_empty() || self.name.contains('/') {
            return Err(BuilderError::InvalidExport(format!(
                "catalog name '{}' must be non-empty and contain no '/'",
                self.name
            )));
        }
        if self.directory.is_empty() {
            return Err(BuilderError::InvalidExport(
                "target directory is empty".to_string(),
            ));
        }

        let check = |column: &str, role: &'static str| {
            if columns.contains(&column) {
                Ok(())
            } else {
                Err(BuilderError::UnknownColumn {
                    column: column.to_string(),
                    role,
                })
            }
        };

        check(&self.path_column, "path column")?;
        check(&self.variable_column, "variable column")?;
        for attr in &self.groupby_attrs {
            check(attr, "groupby attribute")?;
        }
        for aggregation in &self.aggregations {
            check(&aggregation.attribute_name, "aggregation attribute")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["installation", "variable_id", "path"];

    fn export() -> ExportSettings {
        ExportSettings {
            name: "era-ren-collection".to_string(),
            directory: "memory:///catalogs".to_string(),
            path_column: "path".to_string(),
            variable_column: "variable_id".to_string(),
            data_format: DataFormat::Zarr,
            groupby_attrs: vec!["installation".to_string()],
            aggregations: vec![Aggregation::union("variable_id")],
            description: String::new(),
            catalog_file: None,
        }
    }

    #[test]
    fn test_filters() {
        let filters = BuilderSettings::new(vec!["s3://b/".to_string()], 2)
            .with_include_patterns(vec!["**/.zmetadata".to_string()])
            .with_exclude_patterns(vec!["**/ERA5/**".to_string()])
            .compile()
            .unwrap();

        assert!(filters.is_asset("s3://b/x/.zmetadata"));
        assert!(!filters.is_asset("s3://b/x/.zattrs"));
        assert!(!filters.is_asset("s3://b/ERA5/x/.zmetadata"));
        assert!(filters.is_excluded("s3://b/ERA5/"));
        assert!(filters.ends_descent("s3://b/x/.zmetadata"));
        assert!(!filters.ends_descent("s3://b/x/.zattrs"));
    }

    #[test]
    fn test_no_include_patterns_accepts_all() {
        let filters = BuilderSettings::new(vec!["/data".to_string()], 0)
            .compile()
            .unwrap();
        assert!(filters.is_asset("/data/anything.nc"));
        assert!(!filters.ends_descent("/data/anything.nc"));
    }

    #[test]
    fn test_invalid_settings() {
        assert!(BuilderSettings::new(vec![], 1).compile().is_err());

        let mut settings = BuilderSettings::new(vec!["/data".to_string()], 1);
        settings.list_concurrency = 0;
        assert!(settings.compile().is_err());

        let settings = BuilderSettings::new(vec!["/data".to_string()], 1)
            .with_exclude_patterns(vec![String::new()]);
        assert!(matches!(
            settings.compile(),
            Err(BuilderError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_export_validation() {
        assert!(export().validate(COLUMNS).is_ok());

        let mut bad = export();
        bad.groupby_attrs.push("member_id".to_string());
        assert!(matches!(
            bad.validate(COLUMNS),
            Err(BuilderError::UnknownColumn { column, role: "groupby attribute" }) if column == "member_id"
        ));

        let mut bad = export();
        bad.variable_column = "station_id".to_string();
        assert!(bad.validate(COLUMNS).is_err());

        let mut bad = export();
        bad.name = "nested/name".to_string();
        assert!(matches!(bad.validate(COLUMNS), Err(BuilderError::InvalidExport(_))));
    }

    #[test]
    fn test_settings_from_json_defaults() {
        let settings: BuilderSettings =
            serde_json::from_str(r#"{"paths": ["s3://b/"], "depth": 5}"#).unwrap();
        assert_eq!(settings.list_concurrency, DEFAULT_LIST_CONCURRENCY);
        assert!(settings.include_patterns.is_empty());
    }
}
