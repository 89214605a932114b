//! Parse outcomes and the parser/record traits shared by all collections.

use serde::Serialize;
use std::hash::Hash;

use crate::error::ParseError;

/// A row of a catalog table.
///
/// `COLUMNS` lists the attribute names in the order the record serializes
/// them; exported tables use exactly this header.
pub trait CatalogRecord: Serialize + Clone + Eq + Hash + Send + Sync + 'static {
    /// Column names, in serialization order.
    const COLUMNS: &'static [&'static str];

    /// Canonical address of the underlying store.
    fn path(&self) -> &str;
}

/// A path that could not be parsed.
///
/// Serializes with the `INVALID_ASSET` / `TRACEBACK` column names catalog
/// tooling uses to flag rejected rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InvalidAsset {
    /// The original, unmodified input path
    #[serde(rename = "INVALID_ASSET")]
    pub path: String,
    /// What failed and where
    #[serde(rename = "TRACEBACK")]
    pub traceback: String,
}

impl InvalidAsset {
    pub fn new(parser: &str, path: &str, error: &ParseError) -> Self {
        Self {
            path: path.to_string(),
            traceback: format!(
                "{}: {} while parsing '{}': {}",
                parser,
                error.kind(),
                path,
                error
            ),
        }
    }
}

/// Result of parsing one asset path: a record or an invalid-asset row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParseOutcome<R> {
    Asset(R),
    Invalid(InvalidAsset),
}

impl<R> ParseOutcome<R> {
    pub fn is_valid(&self) -> bool {
        matches!(self, ParseOutcome::Asset(_))
    }

    /// The parsed record, if any.
    pub fn record(&self) -> Option<&R> {
        match self {
            ParseOutcome::Asset(record) => Some(record),
            ParseOutcome::Invalid(_) => None,
        }
    }

    /// The invalid-asset row, if parsing failed.
    pub fn invalid(&self) -> Option<&InvalidAsset> {
        match self {
            ParseOutcome::Asset(_) => None,
            ParseOutcome::Invalid(invalid) => Some(invalid),
        }
    }

    pub fn into_result(self) -> Result<R, InvalidAsset> {
        match self {
            ParseOutcome::Asset(record) => Ok(record),
            ParseOutcome::Invalid(invalid) => Err(invalid),
        }
    }
}

/// Turns asset paths of one collection into catalog records.
///
/// Implementors only write [`try_parse`](AssetParser::try_parse); the
/// provided [`parse`](AssetParser::parse) folds every error into an
/// [`InvalidAsset`] carrying the original path.
pub trait AssetParser: Send + Sync {
    type Record: CatalogRecord;

    /// Parser name used in tracebacks and logs.
    fn name(&self) -> &'static str;

    fn try_parse(&self, path: &str) -> Result<Self::Record, ParseError>;

    fn parse(&self, path: &str) -> ParseOutcome<Self::Record> {
        match self.try_parse(path) {
            Ok(record) => ParseOutcome::Asset(record),
            Err(e) => ParseOutcome::Invalid(InvalidAsset::new(self.name(), path, &e)),
        }
    }
}
