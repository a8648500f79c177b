//! Core domain models and logic for tpl
//!
//! This crate contains:
//! - Domain models (Design, CategoryBucket, SearchResultSet)
//! - Bucket and flat-list merging with de-duplication
//! - Priority composition for display
//! - Visibility filtering (premium / feature-restricted designs)

pub mod design;
pub mod merge;
pub mod visibility;

pub use design::{CategoryBucket, Design, SearchResultSet};
pub use merge::{ComposedResults, RankedDesign, compose_for_display, flatten, merge_buckets, merge_flat};
pub use visibility::VisibilityFilter;
