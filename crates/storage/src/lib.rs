//! Storage abstractions for catalog generation.
//!
//! Provides unified access to the places catalogs are crawled from and
//! written to:
//! - Amazon S3 and S3-compatible object stores
//! - The local filesystem
//! - In-memory stores for tests and dry runs

pub mod location;
pub mod object_store;
pub mod resolver;

pub use self::object_store::{DirectoryListing, ObjectStorage, ObjectStorageConfig};
pub use location::{Scheme, StorageLocation};
pub use resolver::StorageResolver;
