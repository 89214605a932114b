//! Common types shared across the catalog crates and the cataloger service.

pub mod error;
pub mod esm;

pub use error::{CatalogError, CatalogResult};
pub use esm::{
    Aggregation, AggregationControl, AggregationType, Assets, AttributeColumn, DataFormat,
    EsmCollection, ESMCAT_VERSION,
};
