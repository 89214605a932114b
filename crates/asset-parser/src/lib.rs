//! Asset path parsing for ESM catalogs.
//!
//! Each catalog collection stores its assets under a fixed directory
//! template, so the attributes of a record can be read straight from the
//! object path. A parser turns one path into either a typed record or an
//! [`InvalidAsset`] row; it never panics and never performs I/O, so the
//! builder can call it from any number of threads.
//!
//! Two collections are supported:
//!
//! - [`RenewablesParser`]: WRF-downscaled renewables generation data
//!   (`s3://wfclimres/...`)
//! - [`HdpParser`]: historical weather-station data
//!   (`s3://wecc-historical-wx/4_merge_wx/...`)

pub mod error;
pub mod hdp;
pub mod outcome;
pub mod renewables;
pub mod simulation;

pub use error::ParseError;
pub use hdp::{HdpParser, StationRecord, HDP_ROOT};
pub use outcome::{AssetParser, CatalogRecord, InvalidAsset, ParseOutcome};
pub use renewables::{
    parse_renewables_path, RenewablesParser, RenewablesRecord, ACTIVITY_ID, INSTITUTION_ID,
    RENEWABLES_ROOT,
};
pub use simulation::Simulation;

/// Consolidated Zarr metadata file that marks the top of a store.
pub const METADATA_FILE: &str = ".zmetadata";

/// Address of the store that owns `path`, with a terminal metadata file removed.
pub fn store_path(path: &str) -> &str {
    path.strip_suffix(METADATA_FILE).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_path() {
        assert_eq!(store_path("s3://b/x/d03/.zmetadata"), "s3://b/x/d03/");
        assert_eq!(store_path("s3://b/x/d03/.zattrs"), "s3://b/x/d03/.zattrs");
        assert_eq!(store_path(""), "");
    }
}
