//! In-memory catalog table built from parse outcomes.

use std::collections::HashSet;
use tracing::{info, warn};

use asset_parser::{CatalogRecord, InvalidAsset, ParseOutcome};

/// Valid records and invalid-asset rows, each in crawl order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTable<R> {
    records: Vec<R>,
    invalid_assets: Vec<InvalidAsset>,
}

/// What [`CatalogTable::clean`] removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Rows dropped because their path could not be parsed
    pub invalid_assets: Vec<InvalidAsset>,
    pub duplicates_removed: usize,
    pub records_kept: usize,
}

impl<R: CatalogRecord> CatalogTable<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            invalid_assets: Vec::new(),
        }
    }

    /// Split parse outcomes into records and invalid rows, keeping order.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = ParseOutcome<R>>) -> Self {
        let mut table = Self::new(Vec::new());
        for outcome in outcomes {
            match outcome {
                ParseOutcome::Asset(record) => table.records.push(record),
                ParseOutcome::Invalid(invalid) => table.invalid_assets.push(invalid),
            }
        }
        table
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn invalid_assets(&self) -> &[InvalidAsset] {
        &self.invalid_assets
    }

    /// Number of valid records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    /// Drop invalid rows and exact duplicate records (first occurrence wins).
    pub fn clean(&mut self) -> CleanReport {
        let invalid_assets = std::mem::take(&mut self.invalid_assets);
        if !invalid_assets.is_empty() {
            warn!(
                count = invalid_assets.len(),
                "Dropping invalid assets from catalog"
            );
            for invalid in &invalid_assets {
                warn!(path = %invalid.path, traceback = %invalid.traceback, "Invalid asset");
            }
        }

        let before = self.records.len();
        let mut seen = HashSet::with_capacity(before);
        self.records.retain(|record| seen.insert(record.clone()));
        let duplicates_removed = before - self.records.len();

        info!(
            records = self.records.len(),
            invalid = invalid_assets.len(),
            duplicates = duplicates_removed,
            "Cleaned catalog"
        );

        CleanReport {
            invalid_assets,
            duplicates_removed,
            records_kept: self.records.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset_parser::{AssetParser, RenewablesParser};

    const GOOD: &str =
        "s3://wfclimres/era/pv_distributed/ec-earth3/historical/1hr/cf/d03/.zmetadata";
    const OTHER: &str = "s3://wfclimres/era/windpower_onshore/era5/reanalysis/1hr/cf/d02/.zmetadata";

    #[test]
    fn test_clean_drops_invalid_and_duplicates() {
        let parser = RenewablesParser::default();
        let paths = [GOOD, "s3://wfclimres/era/too/short", OTHER, GOOD];
        let mut table = CatalogTable::from_outcomes(paths.iter().map(|p| parser.parse(p)));

        assert_eq!(table.len(), 3);
        assert_eq!(table.invalid_assets().len(), 1);

        let report = table.clean();
        assert_eq!(report.invalid_assets[0].path, "s3://wfclimres/era/too/short");
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.records_kept, 2);
        assert!(table.invalid_assets().is_empty());

        let kept: Vec<_> = table.records().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            kept,
            vec![
                "s3://wfclimres/era/pv_distributed/ec-earth3/historical/1hr/cf/d03/",
                "s3://wfclimres/era/windpower_onshore/era5/reanalysis/1hr/cf/d02/",
            ]
        );
    }

    #[test]
    fn test_clean_on_clean_table_is_noop() {
        let parser = RenewablesParser::default();
        let mut table = CatalogTable::from_outcomes([parser.parse(GOOD)]);
        let report = table.clean();
        assert_eq!(report, CleanReport {
            invalid_assets: vec![],
            duplicates_removed: 0,
            records_kept: 1,
        });
        assert_eq!(table.columns().last(), Some(&"path"));
    }
}
