//! Historical Data Platform collection (merged weather-station records).
//!
//! Store layout:
//!
//! ```text
//! s3://wecc-historical-wx/4_merge_wx/<network_id>/<station_id>.zarr/.zmetadata
//! ```

use serde::Serialize;

use crate::error::ParseError;
use crate::outcome::{AssetParser, CatalogRecord};
use crate::{store_path, METADATA_FILE};

/// Bucket prefix of the production collection.
pub const HDP_ROOT: &str = "s3://wecc-historical-wx/4_merge_wx/";

const STORE_SUFFIX: &str = ".zarr";

/// One station store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StationRecord {
    pub network_id: String,
    pub station_id: String,
    pub path: String,
}

impl CatalogRecord for StationRecord {
    const COLUMNS: &'static [&'static str] = &["network_id", "station_id", "path"];

    fn path(&self) -> &str {
        &self.path
    }
}

/// Parser for station store paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdpParser {
    root: String,
}

impl HdpParser {
    pub fn new(root: impl Into<String>) -> Self {
        let mut root = root.into();
        if !root.ends_with('/') {
            root.push('/');
        }
        Self { root }
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}

impl Default for HdpParser {
    fn default() -> Self {
        Self::new(HDP_ROOT)
    }
}

impl AssetParser for HdpParser {
    type Record = StationRecord;

    fn name(&self) -> &'static str {
        "hdp"
    }

    fn try_parse(&self, path: &str) -> Result<StationRecord, ParseError> {
        let rest = path.strip_prefix(self.root.as_str()).ok_or_else(|| {
            ParseError::MalformedPath(format!("missing root prefix '{}'", self.root))
        })?;

        // Either the store itself or its consolidated metadata file
        let store = match rest.strip_suffix(METADATA_FILE) {
            Some(store) => store.strip_suffix('/').unwrap_or(store),
            None => rest,
        };

        let segments: Vec<&str> = store.split('/').collect();
        let [network_id, station] = segments.as_slice() else {
            return Err(ParseError::MalformedPath(format!(
                "expected <network>/<station>{} after '{}', found {} segments",
                STORE_SUFFIX,
                self.root,
                segments.len()
            )));
        };

        let station_id = station.strip_suffix(STORE_SUFFIX).unwrap_or(station);
        if network_id.is_empty() || station_id.is_empty() {
            return Err(ParseError::MalformedPath(format!(
                "empty network or station in '{}'",
                store
            )));
        }

        Ok(StationRecord {
            network_id: network_id.to_string(),
            station_id: station_id.to_string(),
            path: store_path(path).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metadata_path() {
        let record = HdpParser::default()
            .try_parse("s3://wecc-historical-wx/4_merge_wx/ASOSAWOS/ASOSAWOS_72493023230.zarr/.zmetadata")
            .unwrap();

        assert_eq!(record.network_id, "ASOSAWOS");
        assert_eq!(record.station_id, "ASOSAWOS_72493023230");
        assert_eq!(
            record.path,
            "s3://wecc-historical-wx/4_merge_wx/ASOSAWOS/ASOSAWOS_72493023230.zarr/"
        );
    }

    #[test]
    fn test_parse_store_path() {
        let record = HdpParser::default()
            .try_parse("s3://wecc-historical-wx/4_merge_wx/CWOP/CWOP_E1234.zarr")
            .unwrap();
        assert_eq!(record.station_id, "CWOP_E1234");
        assert_eq!(record.path, "s3://wecc-historical-wx/4_merge_wx/CWOP/CWOP_E1234.zarr");
    }

    #[test]
    fn test_rejects_other_layouts() {
        let parser = HdpParser::default();
        assert!(parser
            .try_parse("s3://wecc-historical-wx/4_merge_wx/merge_logs/2024/run.log")
            .is_err());
        assert!(parser
            .try_parse("s3://wecc-historical-wx/4_merge_wx/CWOP/.zmetadata")
            .is_err());
        assert!(parser
            .try_parse("s3://wecc-historical-wx/3_qaqc_wx/CWOP/CWOP_E1234.zarr/.zmetadata")
            .is_err());
    }

    #[test]
    fn test_columns() {
        assert_eq!(StationRecord::COLUMNS, &["network_id", "station_id", "path"]);
    }
}
