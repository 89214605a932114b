//! Parsing of storage location strings.
//!
//! Catalog paths are plain strings (`s3://bucket/key`, `memory:///key`,
//! `file:///abs/key` or `/abs/key`). A [`StorageLocation`] splits one into
//! the store it lives in and the key within that store, and can rebuild the
//! full string for any other key of the same store.

use std::fmt;

use catalog_common::{CatalogError, CatalogResult};

/// Which object store a location belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Amazon S3 (or an S3-compatible endpoint)
    S3 { bucket: String },
    /// Process-local in-memory store
    Memory,
    /// Local filesystem rooted at `/`
    Local,
}

/// A store plus a key inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageLocation {
    scheme: Scheme,
    /// Everything before the key, e.g. `s3://bucket/`
    base: String,
    key: String,
}

impl StorageLocation {
    /// Parse a location string.
    pub fn parse(location: &str) -> CatalogResult<Self> {
        let invalid = |message: &str| CatalogError::InvalidLocation {
            location: location.to_string(),
            message: message.to_string(),
        };

        if let Some(rest) = location.strip_prefix("s3://") {
            let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
            if bucket.is_empty() {
                return Err(invalid("missing bucket name"));
            }
            return Ok(Self {
                scheme: Scheme::S3 {
                    bucket: bucket.to_string(),
                },
                base: format!("s3://{}/", bucket),
                key: key.to_string(),
            });
        }

        if let Some(rest) = location.strip_prefix("memory://") {
            return Ok(Self {
                scheme: Scheme::Memory,
                base: "memory:///".to_string(),
                key: rest.trim_start_matches('/').to_string(),
            });
        }

        if let Some(rest) = location.strip_prefix("file://") {
            if !rest.starts_with('/') {
                return Err(invalid("file URLs must be absolute"));
            }
            return Ok(Self {
                scheme: Scheme::Local,
                base: "file:///".to_string(),
                key: rest.trim_start_matches('/').to_string(),
            });
        }

        if location.starts_with('/') {
            return Ok(Self {
                scheme: Scheme::Local,
                base: "/".to_string(),
                key: location.trim_start_matches('/').to_string(),
            });
        }

        match location.split_once("://") {
            Some((scheme, _)) => Err(CatalogError::UnsupportedScheme(scheme.to_string())),
            None => Err(invalid("expected an s3://, memory://, file:// or absolute path")),
        }
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Key within the store (no leading `/`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Prefix shared by every location of the same store, e.g. `s3://bucket/`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Identifier of the store, used to share clients between locations.
    ///
    /// `file:///abs` and `/abs` are separate stores so each keeps its own
    /// spelling in the locations it hands out.
    pub fn store_id(&self) -> String {
        match &self.scheme {
            Scheme::S3 { bucket } => format!("s3://{}", bucket),
            Scheme::Memory => "memory://".to_string(),
            Scheme::Local => format!("local:{}", self.base),
        }
    }

    /// Full location string of another key in the same store.
    pub fn url_for(&self, key: &str) -> String {
        format!("{}{}", self.base, key)
    }

    /// Location of `name` inside this one (treated as a directory).
    pub fn join(&self, name: &str) -> Self {
        let key = if self.key.is_empty() || self.key.ends_with('/') {
            format!("{}{}", self.key, name)
        } else {
            format!("{}/{}", self.key, name)
        };
        Self {
            scheme: self.scheme.clone(),
            base: self.base.clone(),
            key,
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.key)
    }
}
