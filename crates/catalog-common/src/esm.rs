//! ESM collection document model.
//!
//! An ESM collection is the JSON half of an intake-esm catalog. It names the
//! tabular catalog file, lists the attribute columns that can be queried, and
//! tells the reader how to combine rows into datasets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

/// ESM collection specification version written by this crate.
pub const ESMCAT_VERSION: &str = "0.1.0";

/// Storage format of the assets referenced by the path column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// Zarr stores (one directory per asset)
    Zarr,
    /// NetCDF files
    Netcdf,
    /// Kerchunk-style reference files
    Reference,
}

impl DataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Zarr => "zarr",
            DataFormat::Netcdf => "netcdf",
            DataFormat::Reference => "reference",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zarr" => Ok(DataFormat::Zarr),
            "netcdf" | "nc" => Ok(DataFormat::Netcdf),
            "reference" => Ok(DataFormat::Reference),
            _ => Err(CatalogError::UnknownDataFormat(s.to_string())),
        }
    }
}

/// How the reader combines the datasets of one group along an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationType {
    /// Merge datasets that hold different variables
    Union,
    /// Concatenate along a new dimension named after the attribute
    JoinNew,
    /// Concatenate along an existing dimension
    JoinExisting,
}

impl FromStr for AggregationType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(AggregationType::Union),
            "join_new" => Ok(AggregationType::JoinNew),
            "join_existing" => Ok(AggregationType::JoinExisting),
            _ => Err(CatalogError::UnknownAggregationType(s.to_string())),
        }
    }
}

/// A single aggregation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    #[serde(rename = "type")]
    pub aggregation_type: AggregationType,
    pub attribute_name: String,
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl Aggregation {
    /// Union over `attribute_name` with no options.
    pub fn union(attribute_name: impl Into<String>) -> Self {
        Self {
            aggregation_type: AggregationType::Union,
            attribute_name: attribute_name.into(),
            options: BTreeMap::new(),
        }
    }
}

/// Grouping and aggregation instructions for the catalog reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationControl {
    pub variable_column_name: String,
    pub groupby_attrs: Vec<String>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
}

/// Describes which column holds asset locations and their format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    pub column_name: String,
    pub format: DataFormat,
}

/// A queryable attribute column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeColumn {
    pub column_name: String,
    #[serde(default)]
    pub vocabulary: String,
}

impl AttributeColumn {
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            vocabulary: String::new(),
        }
    }
}

/// The ESM collection document (`<name>.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsmCollection {
    pub esmcat_version: String,
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub catalog_file: String,
    pub attributes: Vec<AttributeColumn>,
    pub assets: Assets,
    pub aggregation_control: AggregationControl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl EsmCollection {
    /// Parse a collection document from JSON.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json)
            .map_err(|e| CatalogError::InvalidDocument(format!("ESM collection: {}", e)))
    }

    /// Serialize as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Names of the queryable attribute columns.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .map(|a| a.column_name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EsmCollection {
        EsmCollection {
            esmcat_version: ESMCAT_VERSION.to_string(),
            id: "era-ren-collection".to_string(),
            description: "Renewables".to_string(),
            catalog_file: "s3://wfclimres/era/era-ren-collection.csv".to_string(),
            attributes: vec![
                AttributeColumn::new("installation"),
                AttributeColumn::new("variable_id"),
            ],
            assets: Assets {
                column_name: "path".to_string(),
                format: DataFormat::Zarr,
            },
            aggregation_control: AggregationControl {
                variable_column_name: "variable_id".to_string(),
                groupby_attrs: vec!["installation".to_string()],
                aggregations: vec![Aggregation::union("variable_id")],
            },
            last_updated: None,
        }
    }

    #[test]
    fn test_data_format_parsing() {
        assert_eq!("zarr".parse::<DataFormat>().unwrap(), DataFormat::Zarr);
        assert_eq!("NetCDF".parse::<DataFormat>().unwrap(), DataFormat::Netcdf);
        assert!("grib".parse::<DataFormat>().is_err());
        assert_eq!(DataFormat::Reference.to_string(), "reference");
    }

    #[test]
    fn test_aggregation_wire_names() {
        let json = serde_json::to_value(Aggregation::union("variable_id")).unwrap();
        assert_eq!(json["type"], "union");
        assert_eq!(json["attribute_name"], "variable_id");
        assert!(json["options"].as_object().unwrap().is_empty());

        assert_eq!(
            "join_existing".parse::<AggregationType>().unwrap(),
            AggregationType::JoinExisting
        );
        assert!("concat".parse::<AggregationType>().is_err());
    }

    #[test]
    fn test_collection_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&sample().to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["esmcat_version"], "0.1.0");
        assert_eq!(json["assets"]["format"], "zarr");
        assert_eq!(json["attributes"][0]["vocabulary"], "");
        assert_eq!(
            json["aggregation_control"]["groupby_attrs"],
            serde_json::json!(["installation"])
        );
        // Unset timestamps are omitted entirely
        assert!(json.get("last_updated").is_none());
    }

    #[test]
    fn test_collection_reads_reader_written_document() {
        let json = r#"{
            "esmcat_version": "0.1.0",
            "id": "era-hdp-collection",
            "description": "HDP",
            "catalog_file": "https://example.com/era-hdp-collection.csv",
            "attributes": [{"column_name": "network_id", "vocabulary": ""}],
            "assets": {"column_name": "path", "format": "zarr"},
            "aggregation_control": {
                "variable_column_name": "station_id",
                "groupby_attrs": ["network_id", "station_id"],
                "aggregations": [{"type": "union", "attribute_name": "station_id"}]
            }
        }"#;

        let collection = EsmCollection::from_json(json).unwrap();
        assert_eq!(collection.attribute_names(), vec!["network_id"]);
        assert_eq!(
            collection.aggregation_control.aggregations[0].aggregation_type,
            AggregationType::Union
        );
    }

    #[test]
    fn test_collection_rejects_missing_assets() {
        let err = EsmCollection::from_json(r#"{"id": "x"}"#).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDocument(_)));
    }
}
