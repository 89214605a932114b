//! Cataloger service library.
//!
//! This module exposes the internal modules for testing purposes.

pub mod config;
pub mod config_loader;
pub mod pipeline;

pub use config::{CatalogJob, CatalogerConfig, LoggingSettings, ParserKind};
pub use pipeline::{parse_paths, CatalogPipeline, CatalogSummary};
