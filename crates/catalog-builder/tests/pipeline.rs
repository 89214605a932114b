//! End-to-end crawl, build, clean and export against seeded in-memory buckets.

use std::sync::Arc;

use asset_parser::{HdpParser, RenewablesParser, RenewablesRecord};
use catalog_builder::{
    save, update_catalog_file_key, Builder, BuilderError, BuilderSettings, CatalogTable,
    ExportSettings,
};
use catalog_common::{Aggregation, DataFormat, EsmCollection};
use storage::{StorageLocation, StorageResolver};
use test_utils::fixtures::{hdp, renewables};
use test_utils::{assert_same_items, seeded_resolver};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn renewables_settings() -> BuilderSettings {
    BuilderSettings::new(renewables::roots(), renewables::DEPTH)
        .with_include_patterns(strings(&renewables::INCLUDE_PATTERNS))
        .with_exclude_patterns(strings(&renewables::EXCLUDE_PATTERNS))
}

fn renewables_export(directory: &str) -> ExportSettings {
    ExportSettings {
        name: "era-ren-collection".to_string(),
        directory: directory.to_string(),
        path_column: "path".to_string(),
        variable_column: "variable_id".to_string(),
        data_format: DataFormat::Zarr,
        groupby_attrs: strings(&[
            "installation",
            "activity_id",
            "institution_id",
            "source_id",
            "experiment_id",
            "table_id",
            "grid_label",
        ]),
        aggregations: vec![Aggregation::union("variable_id")],
        description: "Eagle Rock Analytics Renewables Data Catalog".to_string(),
        catalog_file: None,
    }
}

async fn storage_text(resolver: &StorageResolver, location: &str) -> String {
    let location = StorageLocation::parse(location).unwrap();
    let bytes = resolver
        .resolve(&location)
        .unwrap()
        .get(location.key())
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_crawl_honors_depth_include_and_exclude() {
    let resolver = seeded_resolver(renewables::BUCKET_URL, &renewables::all_keys()).await;
    let builder = Builder::new(renewables_settings(), resolver).unwrap();

    let assets = builder.get_assets().await.unwrap();
    let expected: Vec<String> = renewables::STORE_KEYS.iter().map(|k| renewables::url(k)).collect();
    assert_eq!(assets, expected);
}

#[tokio::test]
async fn test_build_clean_save_renewables() {
    let mut keys = renewables::all_keys();
    keys.push(renewables::UNKNOWN_SIMULATION_KEY);
    let resolver = seeded_resolver(renewables::BUCKET_URL, &keys).await;
    let builder = Builder::new(renewables_settings(), resolver.clone()).unwrap();

    let mut table = builder.build(&RenewablesParser::default()).await.unwrap();
    assert_eq!(table.len(), renewables::STORE_KEYS.len());
    assert_eq!(table.invalid_assets().len(), 1);
    assert!(table.invalid_assets()[0].traceback.contains("UnknownSimulation"));

    let report = table.clean();
    assert_eq!(report.invalid_assets.len(), 1);
    assert_eq!(report.duplicates_removed, 0);

    let exported = save(&table, &renewables_export("memory:///catalogs"), &resolver)
        .await
        .unwrap();
    assert_eq!(exported.rows, renewables::STORE_KEYS.len());
    assert_eq!(exported.csv_location, "memory:///catalogs/era-ren-collection.csv");

    let csv = storage_text(&resolver, &exported.csv_location).await;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("installation,activity_id,institution_id,source_id,experiment_id,table_id,variable_id,grid_label,path")
    );
    assert_eq!(
        lines.next(),
        Some("pv_distributed,WRF,ERA,EC-Earth3,historical,1hr,cf,d03,s3://wfclimres/era/pv_distributed/ec-earth3/historical/1hr/cf/d03/")
    );
    assert_eq!(lines.count(), renewables::STORE_KEYS.len() - 1);

    let json = storage_text(&resolver, &exported.json_location).await;
    let collection = EsmCollection::from_json(&json).unwrap();
    assert_eq!(collection.id, "era-ren-collection");
    assert_eq!(collection.catalog_file, exported.csv_location);
    assert_eq!(collection.assets.column_name, "path");
    assert_eq!(collection.assets.format, DataFormat::Zarr);
    assert_eq!(collection.aggregation_control.variable_column_name, "variable_id");
    assert_eq!(collection.aggregation_control.groupby_attrs.len(), 7);
    assert_eq!(collection.attribute_names().len(), 8);
    assert!(!collection.attribute_names().contains(&"path"));
}

#[tokio::test]
async fn test_build_hdp_stations() {
    let resolver = seeded_resolver(hdp::BUCKET_URL, &hdp::all_keys()).await;
    let settings = BuilderSettings::new(vec![hdp::ROOT.to_string()], hdp::DEPTH)
        .with_include_patterns(strings(&["**/.zmetadata"]))
        .with_exclude_patterns(strings(&hdp::EXCLUDE_PATTERNS));
    let builder = Builder::new(settings, resolver).unwrap();

    let table = builder.build(&HdpParser::default()).await.unwrap();
    assert!(table.invalid_assets().is_empty());
    assert_same_items!(
        table.records().iter().map(|r| r.station_id.clone()),
        strings(&["ASOSAWOS_72493023230", "CIMIS_2", "RAWS_ABEC1"])
    );
}

#[tokio::test]
async fn test_save_rejects_unknown_columns_without_writing() {
    let resolver = seeded_resolver(renewables::BUCKET_URL, &renewables::STORE_KEYS).await;
    let builder = Builder::new(renewables_settings(), resolver.clone()).unwrap();
    let table = builder.build(&RenewablesParser::default()).await.unwrap();

    let mut export = renewables_export("memory:///rejected");
    export.groupby_attrs.push("member_id".to_string());
    let err = save(&table, &export, &resolver).await.unwrap_err();
    assert!(matches!(err, BuilderError::UnknownColumn { ref column, .. } if column == "member_id"));

    let mut export = renewables_export("memory:///rejected");
    export.path_column = "uri".to_string();
    assert!(save(&table, &export, &resolver).await.is_err());

    let out = StorageLocation::parse("memory:///rejected/").unwrap();
    let listing = resolver.resolve(&out).unwrap().list("rejected").await.unwrap();
    assert!(listing.is_empty());
}

#[tokio::test]
async fn test_save_rejects_empty_table() {
    let resolver = Arc::new(StorageResolver::default());
    let table: CatalogTable<RenewablesRecord> = CatalogTable::new(Vec::new());
    let err = save(&table, &renewables_export("memory:///empty"), &resolver)
        .await
        .unwrap_err();
    assert!(matches!(err, BuilderError::EmptyCatalog(_)));
}

#[tokio::test]
async fn test_update_catalog_file_key_only_touches_catalog_file() {
    let resolver = seeded_resolver(renewables::BUCKET_URL, &renewables::STORE_KEYS).await;
    let builder = Builder::new(renewables_settings(), resolver.clone()).unwrap();
    let table = builder.build(&RenewablesParser::default()).await.unwrap();

    // Output lives in the same bucket as the data
    let exported = save(&table, &renewables_export("s3://wfclimres/era"), &resolver)
        .await
        .unwrap();
    assert_eq!(exported.collection.catalog_file, "s3://wfclimres/era/era-ren-collection.csv");
    let before: serde_json::Value =
        serde_json::from_str(&storage_text(&resolver, &exported.json_location).await).unwrap();

    let catalog_file = update_catalog_file_key(
        "s3://wfclimres/era",
        "https://wfclimres.s3.amazonaws.com/era",
        "era-ren-collection",
        &resolver,
    )
    .await
    .unwrap();
    assert_eq!(
        catalog_file,
        "https://wfclimres.s3.amazonaws.com/era/era-ren-collection.csv"
    );

    let after: serde_json::Value =
        serde_json::from_str(&storage_text(&resolver, &exported.json_location).await).unwrap();
    assert_eq!(after["catalog_file"], catalog_file.as_str());

    let (mut before, mut after) = (before, after);
    before.as_object_mut().unwrap().remove("catalog_file");
    after.as_object_mut().unwrap().remove("catalog_file");
    assert_eq!(before, after);
}
