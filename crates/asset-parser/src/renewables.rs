//! Renewables collection (WRF-downscaled generation profiles).
//!
//! Store layout:
//!
//! ```text
//! s3://wfclimres/<institution>/<installation>/<simulation>/<experiment_id>/<table_id>/<variable_id>/<grid_label>/.zmetadata
//! ```

use serde::Serialize;

use crate::error::ParseError;
use crate::outcome::{AssetParser, CatalogRecord, ParseOutcome};
use crate::simulation::Simulation;
use crate::store_path;

/// Bucket prefix of the production collection.
pub const RENEWABLES_ROOT: &str = "s3://wfclimres/";

/// Every record in the collection comes from the WRF downscaling activity.
pub const ACTIVITY_ID: &str = "WRF";

/// Every record in the collection is produced by ERA.
pub const INSTITUTION_ID: &str = "ERA";

const SEGMENT_COUNT: usize = 8;

/// One Zarr store of the renewables collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RenewablesRecord {
    /// Generation technology, e.g. `pv_distributed`
    pub installation: String,
    pub activity_id: &'static str,
    pub institution_id: &'static str,
    pub source_id: Simulation,
    pub experiment_id: String,
    pub table_id: String,
    pub variable_id: String,
    pub grid_label: String,
    pub path: String,
}

impl CatalogRecord for RenewablesRecord {
    const COLUMNS: &'static [&'static str] = &[
        "installation",
        "activity_id",
        "institution_id",
        "source_id",
        "experiment_id",
        "table_id",
        "variable_id",
        "grid_label",
        "path",
    ];

    fn path(&self) -> &str {
        &self.path
    }
}

/// Parser for renewables store paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewablesParser {
    root: String,
}

impl RenewablesParser {
    /// Parser for stores under `root` (a trailing `/` is added if missing).
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

impl Default for RenewablesParser {
    fn default() -> Self {
        Self::new(RENEWABLES_ROOT)
    }
}

impl AssetParser for RenewablesParser {
    type Record = RenewablesRecord;

    fn name(&self) -> &'static str {
        "renewables"
    }

    fn try_parse(&self, path: &str) -> Result<RenewablesRecord, ParseError> {
        let rest = path.strip_prefix(self.root.as_str()).ok_or_else(|| {
            ParseError::MalformedPath(format!("missing root prefix '{}'", self.root))
        })?;

        let segments: Vec<&str> = rest.split('/').collect();
        let [_institution, installation, simulation, experiment_id, table_id, variable_id, grid_label, _metadata_file] =
            segments.as_slice()
        else {
            return Err(ParseError::MalformedPath(format!(
                "expected {} segments after '{}', found {}",
                SEGMENT_COUNT,
                self.root,
                segments.len()
            )));
        };

        if let Some(position) = segments.iter().position(|s| s.is_empty()) {
            return Err(ParseError::MalformedPath(format!(
                "empty segment at position {} after '{}'",
                position + 1,
                self.root
            )));
        }

        let source_id = Simulation::from_token(simulation)
            .ok_or_else(|| ParseError::UnknownSimulation(simulation.to_string()))?;

        Ok(RenewablesRecord {
            installation: installation.to_string(),
            activity_id: ACTIVITY_ID,
            institution_id: INSTITUTION_ID,
            source_id,
            experiment_id: experiment_id.to_string(),
            table_id: table_id.to_string(),
            variable_id: variable_id.to_string(),
            grid_label: grid_label.to_string(),
            path: store_path(path).to_string(),
        })
    }
}

/// Parse a path of the production renewables collection.
pub fn parse_renewables_path(path: &str) -> ParseOutcome<RenewablesRecord> {
    RenewablesParser::default().parse(path)
}
