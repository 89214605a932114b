//! ESM catalog construction.
//!
//! The pipeline is:
//!
//! 1. [`Builder::get_assets`] crawls the configured roots with delimiter
//!    listings, honoring depth and include/exclude glob patterns.
//! 2. [`Builder::build`] parses every asset with an
//!    [`AssetParser`](asset_parser::AssetParser) into a [`CatalogTable`].
//! 3. [`CatalogTable::clean`] drops invalid rows and duplicate records.
//! 4. [`save`] writes `<name>.csv` and the `<name>.json` collection document.
//! 5. [`update_catalog_file_key`] repoints `catalog_file` at a public HTTPS
//!    URL once the catalog is published.

pub mod builder;
pub mod config;
pub mod crawler;
pub mod error;
pub mod export;
pub mod glob;
pub mod table;

pub use builder::{parse_assets, Builder};
pub use config::{BuilderSettings, CompiledFilters, ExportSettings, DEFAULT_LIST_CONCURRENCY};
pub use crawler::Crawler;
pub use error::{BuilderError, Result};
pub use export::{save, update_catalog_file_key, ExportedCatalog};
pub use glob::GlobPattern;
pub use table::{CatalogTable, CleanReport};
