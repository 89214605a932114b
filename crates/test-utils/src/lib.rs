//! Shared test utilities for the esm-catalog workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Bucket layouts of the renewables and HDP collections
//! - In-memory object stores seeded with those layouts
//! - Workspace path helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, seeded_resolver};
//! ```

pub mod fixtures;
pub mod paths;
pub mod stores;

// Re-export commonly used items at the crate root
pub use paths::*;
pub use stores::*;

/// Assert that two lists hold the same items, ignoring order.
#[macro_export]
macro_rules! assert_same_items {
    ($left:expr, $right:expr) => {{
        let mut left: Vec<_> = $left.into_iter().collect();
        let mut right: Vec<_> = $right.into_iter().collect();
        left.sort();
        right.sort();
        assert_eq!(left, right);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_same_items_passes() {
        assert_same_items!(vec![3, 1, 2], vec![1, 2, 3]);
    }

    #[test]
    #[should_panic]
    fn test_assert_same_items_fails() {
        assert_same_items!(vec![1, 2], vec![1, 3]);
    }
}
