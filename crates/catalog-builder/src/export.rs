//! Writing catalogs as `<name>.csv` plus an ESM collection `<name>.json`.

use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use tracing::{info, instrument};

use asset_parser::CatalogRecord;
use catalog_common::{
    AggregationControl, Assets, AttributeColumn, EsmCollection, ESMCAT_VERSION,
};
use storage::{StorageLocation, StorageResolver};

use crate::config::ExportSettings;
use crate::error::{BuilderError, Result};
use crate::table::CatalogTable;

/// Where a catalog was written and what its collection document says.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedCatalog {
    pub csv_location: String,
    pub json_location: String,
    pub collection: EsmCollection,
    pub rows: usize,
}

/// Write the table and its collection document into `settings.directory`.
///
/// Fails with [`BuilderError::EmptyCatalog`] when the table has no records,
/// and with [`BuilderError::UnknownColumn`] when a configured column is not
/// one of the record columns. Nothing is written in either case.
#[instrument(skip(table, settings, resolver), fields(name = %settings.name, directory = %settings.directory))]
pub async fn save<R: CatalogRecord>(
    table: &CatalogTable<R>,
    settings: &ExportSettings,
    resolver: &StorageResolver,
) -> Result<ExportedCatalog> {
    if table.is_empty() {
        return Err(BuilderError::EmptyCatalog(settings.name.clone()));
    }
    settings.validate(R::COLUMNS)?;

    let directory = StorageLocation::parse(&settings.directory)?;
    let storage = resolver.resolve(&directory)?;
    let csv_location = directory.join(&format!("{}.csv", settings.name));
    let json_location = directory.join(&format!("{}.json", settings.name));

    let csv = write_csv(table.records())?;

    let catalog_file = settings
        .catalog_file
        .clone()
        .unwrap_or_else(|| csv_location.to_string());
    let collection = collection_document::<R>(settings, catalog_file);
    let json = collection.to_json_pretty()?;

    storage.put(csv_location.key(), Bytes::from(csv)).await?;
    storage.put(json_location.key(), Bytes::from(json)).await?;

    info!(
        rows = table.len(),
        csv = %csv_location,
        json = %json_location,
        "Saved catalog"
    );

    Ok(ExportedCatalog {
        csv_location: csv_location.to_string(),
        json_location: json_location.to_string(),
        collection,
        rows: table.len(),
    })
}

/// Serialize records as CSV with a header row of the record columns.
pub fn write_csv<R: CatalogRecord>(records: &[R]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| BuilderError::Csv(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| BuilderError::Csv(e.to_string()))
}

/// Build the collection document for records of type `R`.
pub fn collection_document<R: CatalogRecord>(
    settings: &ExportSettings,
    catalog_file: String,
) -> EsmCollection {
    let attributes = R::COLUMNS
        .iter()
        .filter(|column| **column != settings.path_column)
        .map(|column| AttributeColumn::new(*column))
        .collect();

    EsmCollection {
        esmcat_version: ESMCAT_VERSION.to_string(),
        id: settings.name.clone(),
        description: settings.description.clone(),
        catalog_file,
        attributes,
        assets: Assets {
            column_name: settings.path_column.clone(),
            format: settings.data_format,
        },
        aggregation_control: AggregationControl {
            variable_column_name: settings.variable_column.clone(),
            groupby_attrs: settings.groupby_attrs.clone(),
            aggregations: settings.aggregations.clone(),
        },
        last_updated: Some(Utc::now()),
    }
}

/// Point the `catalog_file` key of `<directory>/<name>.json` at
/// `<https_url>/<name>.csv`, leaving every other key untouched.
///
/// Returns the new `catalog_file` value.
#[instrument(skip(resolver))]
pub async fn update_catalog_file_key(
    directory: &str,
    https_url: &str,
    name: &str,
    resolver: &StorageResolver,
) -> Result<String> {
    let directory = StorageLocation::parse(directory)?;
    let storage = resolver.resolve(&directory)?;
    let json_location = directory.join(&format!("{}.json", name));

    let bytes = storage.get(json_location.key()).await?;
    let mut document: Value = serde_json::from_slice(&bytes).map_err(|e| {
        BuilderError::InvalidDocument {
            location: json_location.to_string(),
            message: e.to_string(),
        }
    })?;

    let catalog_file = format!("{}/{}.csv", https_url.trim_end_matches('/'), name);
    let Some(object) = document.as_object_mut() else {
        return Err(BuilderError::InvalidDocument {
            location: json_location.to_string(),
            message: "expected a JSON object".to_string(),
        });
    };
    object.insert("catalog_file".to_string(), Value::String(catalog_file.clone()));

    let json = serde_json::to_string_pretty(&document)?;
    storage.put(json_location.key(), Bytes::from(json)).await?;

    info!(location = %json_location, catalog_file = %catalog_file, "Updated catalog file key");
    Ok(catalog_file)
}
