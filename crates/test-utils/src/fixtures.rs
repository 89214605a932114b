//! Bucket layouts of the catalog collections.
//!
//! Keys are relative to the bucket; prefix them with the bucket URL to get
//! asset locations.

/// WRF renewables collection in `s3://wfclimres/`.
pub mod renewables {
    pub const BUCKET_URL: &str = "s3://wfclimres/";

    /// Crawl roots of the production catalog.
    pub const ROOTS: [&str; 4] = [
        "s3://wfclimres/era/pv_distributed/",
        "s3://wfclimres/era/pv_utility/",
        "s3://wfclimres/era/windpower_offshore/",
        "s3://wfclimres/era/windpower_onshore/",
    ];

    /// Directories holding mirrors that must not be cataloged.
    pub const EXCLUDE_PATTERNS: [&str; 5] = [
        "**/EC-Earth3/**",
        "**/ERA5/**",
        "**/MIROC6/**",
        "**/MPI-ESM1-2-HR/**",
        "**TaiESM1/**",
    ];

    pub const INCLUDE_PATTERNS: [&str; 1] = ["**/.zmetadata"];

    pub const DEPTH: usize = 5;

    /// Consolidated metadata of the stores that form the catalog.
    pub const STORE_KEYS: [&str; 6] = [
        "era/pv_distributed/ec-earth3/historical/1hr/cf/d03/.zmetadata",
        "era/pv_distributed/miroc6/ssp370/1hr/gen/d03/.zmetadata",
        "era/pv_utility/mpi-esm1-2-hr/historical/day/cf/d02/.zmetadata",
        "era/windpower_offshore/taiesm1/ssp370/1hr/cf/d03/.zmetadata",
        "era/windpower_onshore/era5/reanalysis/1hr/cf/d03/.zmetadata",
        "era/windpower_onshore/era5/reanalysis/1hr/gen/d03/.zmetadata",
    ];

    /// Objects the crawl must skip.
    pub const NOISE_KEYS: [&str; 5] = [
        // Not a metadata file
        "era/pv_distributed/ec-earth3/historical/1hr/cf/d03/.zattrs",
        // Excluded mirror directories
        "era/pv_distributed/EC-Earth3/historical/1hr/cf/d03/.zmetadata",
        "era/pv_utility/TaiESM1/historical/1hr/cf/d03/.zmetadata",
        // Below the crawl depth
        "era/pv_utility/mpi-esm1-2-hr/historical/day/cf/d02/cf/.zmetadata",
        // Outside every root
        "era/docs/.zmetadata",
    ];

    /// A store whose simulation is not in the catalog vocabulary.
    pub const UNKNOWN_SIMULATION_KEY: &str =
        "era/pv_utility/cesm2/historical/1hr/cf/d03/.zmetadata";

    /// Every key of the seeded bucket.
    pub fn all_keys() -> Vec<&'static str> {
        STORE_KEYS.iter().chain(NOISE_KEYS.iter()).copied().collect()
    }

    /// Full asset location of a bucket key.
    pub fn url(key: &str) -> String {
        format!("{}{}", BUCKET_URL, key)
    }

    pub fn roots() -> Vec<String> {
        ROOTS.iter().map(|r| r.to_string()).collect()
    }
}

/// Historical Data Platform collection in `s3://wecc-historical-wx/`.
pub mod hdp {
    pub const BUCKET_URL: &str = "s3://wecc-historical-wx/";

    pub const ROOT: &str = "s3://wecc-historical-wx/4_merge_wx/";

    pub const EXCLUDE_PATTERNS: [&str; 4] = [
        "**/VALLEYWATER/**",
        "**/eraqc_counts_native_timestep/**",
        "**/eraqc_counts_hourly_timestep/**",
        "**/merge_logs/**",
    ];

    pub const DEPTH: usize = 2;

    pub const STORE_KEYS: [&str; 3] = [
        "4_merge_wx/ASOSAWOS/ASOSAWOS_72493023230.zarr/.zmetadata",
        "4_merge_wx/CIMIS/CIMIS_2.zarr/.zmetadata",
        "4_merge_wx/RAWS/RAWS_ABEC1.zarr/.zmetadata",
    ];

    pub const NOISE_KEYS: [&str; 3] = [
        "4_merge_wx/VALLEYWATER/VALLEYWATER_6001.zarr/.zmetadata",
        "4_merge_wx/merge_logs/run.zarr/.zmetadata",
        "4_merge_wx/CIMIS/CIMIS_2.zarr/tas/.zarray",
    ];

    pub fn all_keys() -> Vec<&'static str> {
        STORE_KEYS.iter().chain(NOISE_KEYS.iter()).copied().collect()
    }

    pub fn url(key: &str) -> String {
        format!("{}{}", BUCKET_URL, key)
    }
}
