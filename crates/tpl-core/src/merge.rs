//! Bucket merging and priority composition
//!
//! Everything here is pure: inputs are never mutated and the same inputs
//! always produce the same output. The engine calls these on every keyword
//! resolution and every pagination page.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::design::{CategoryBucket, Design, SearchResultSet};

/// Fold `incoming` buckets into `existing`, matching buckets by category.
///
/// Designs already present in the matching bucket are skipped; new designs
/// keep their incoming order. Categories not seen before are appended after
/// the existing buckets.
pub fn merge_buckets(existing: &SearchResultSet, incoming: &SearchResultSet) -> SearchResultSet {
    let mut merged = existing.clone();

    for bucket in &incoming.buckets {
        match merged
            .buckets
            .iter_mut()
            .find(|b| b.category == bucket.category)
        {
            Some(target) => {
                let mut present: HashSet<String> =
                    target.designs.iter().map(|d| d.id.clone()).collect();
                for design in &bucket.designs {
                    if present.insert(design.id.clone()) {
                        target.designs.push(design.clone());
                    }
                }
            }
            None => {
                merged.buckets.push(CategoryBucket::new(
                    bucket.category.clone(),
                    merge_flat(&[], &bucket.designs),
                ));
            }
        }
    }

    merged
}

/// Append designs from `incoming` whose id is not yet in `existing`
pub fn merge_flat(existing: &[Design], incoming: &[Design]) -> Vec<Design> {
    let mut seen: HashSet<&str> = existing.iter().map(|d| d.id.as_str()).collect();
    let mut merged = existing.to_vec();

    for design in incoming {
        if seen.insert(design.id.as_str()) {
            merged.push(design.clone());
        }
    }

    merged
}

/// All designs of a result set in bucket order, duplicates kept
pub fn flatten(set: &SearchResultSet) -> Vec<Design> {
    set.buckets
        .iter()
        .flat_map(|b| b.designs.iter().cloned())
        .collect()
}

/// A design placed in the final render sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedDesign {
    /// 1-based position across all buckets
    pub position: usize,
    pub category: String,
    pub design: Design,
}

/// Output of [`compose_for_display`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedResults {
    /// Input buckets with designs owned by a higher-priority bucket removed
    pub buckets: Vec<CategoryBucket>,
    /// Render order: highest-priority bucket first
    pub ranked: Vec<RankedDesign>,
}

impl ComposedResults {
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn designs_in(&self, category: &str) -> Vec<&Design> {
        self.ranked
            .iter()
            .filter(|r| r.category == category)
            .map(|r| &r.design)
            .collect()
    }
}

/// Cross-category de-duplication for rendering.
///
/// A design listed in several buckets is kept only in the highest-priority
/// one (lowest index). Positions are numbered 1..N in bucket order.
pub fn compose_for_display(set: &SearchResultSet) -> ComposedResults {
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut composed = ComposedResults::default();

    for bucket in &set.buckets {
        let mut kept = Vec::with_capacity(bucket.designs.len());
        for design in &bucket.designs {
            if claimed.insert(design.id.as_str()) {
                kept.push(design.clone());
            }
        }

        for design in &kept {
            composed.ranked.push(RankedDesign {
                position: composed.ranked.len() + 1,
                category: bucket.category.clone(),
                design: design.clone(),
            });
        }
        composed
            .buckets
            .push(CategoryBucket::new(bucket.category.clone(), kept));
    }

    composed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(category: &str, ids: &[&str]) -> CategoryBucket {
        CategoryBucket::new(category, ids.iter().map(|id| Design::new(*id)).collect())
    }

    fn ids(designs: &[Design]) -> Vec<&str> {
        designs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_merge_buckets_appends_new_ids_only() {
        let existing = SearchResultSet::new(vec![
            bucket("recommended", &["a", "b"]),
            bucket("generic", &["x"]),
        ]);
        let incoming = SearchResultSet::new(vec![
            bucket("recommended", &["b", "c", "c"]),
            bucket("partial", &["p", "p"]),
        ]);

        let merged = merge_buckets(&existing, &incoming);

        assert_eq!(merged.buckets.len(), 3);
        assert_eq!(ids(&merged.buckets[0].designs), vec!["a", "b", "c"]);
        assert_eq!(ids(&merged.buckets[1].designs), vec!["x"]);
        assert_eq!(merged.buckets[2].category, "partial");
        assert_eq!(ids(&merged.buckets[2].designs), vec!["p"]);
    }

    #[test]
    fn test_merge_buckets_into_empty() {
        let incoming = SearchResultSet::new(vec![bucket("recommended", &["a"])]);
        let merged = merge_buckets(&SearchResultSet::default(), &incoming);
        assert_eq!(merged, incoming);
    }

    #[test]
    fn test_merge_buckets_is_idempotent() {
        let x = SearchResultSet::new(vec![bucket("recommended", &["a"]), bucket("generic", &["g"])]);
        let y = SearchResultSet::new(vec![
            bucket("generic", &["g", "h"]),
            bucket("partial", &["p", "a"]),
        ]);

        let once = merge_buckets(&x, &y);
        let twice = merge_buckets(&once, &y);

        assert_eq!(once.buckets.len(), twice.buckets.len());
        for (a, b) in once.buckets.iter().zip(&twice.buckets) {
            assert_eq!(a.category, b.category);
            assert_eq!(ids(&a.designs), ids(&b.designs));
        }
    }

    #[test]
    fn test_merge_flat_keeps_first_seen_order() {
        let existing = vec![Design::new("a"), Design::new("b")];
        let incoming = vec![Design::new("c"), Design::new("a"), Design::new("c"), Design::new("d")];

        let merged = merge_flat(&existing, &incoming);
        assert_eq!(ids(&merged), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_merge_flat_never_duplicates() {
        let batches: Vec<Vec<Design>> = vec![
            vec![Design::new("1"), Design::new("2")],
            vec![Design::new("2"), Design::new("3")],
            vec![Design::new("1"), Design::new("3"), Design::new("4")],
            vec![],
        ];

        let mut flat = Vec::new();
        for batch in &batches {
            flat = merge_flat(&flat, batch);
        }

        let unique: HashSet<&str> = flat.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(unique.len(), flat.len());
        assert_eq!(ids(&flat), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_compose_prefers_higher_priority_bucket() {
        let set = SearchResultSet::new(vec![
            bucket("recommended", &["U1", "r2"]),
            bucket("partial", &["U1", "p1"]),
            bucket("generic", &["g1", "U1", "p1"]),
        ]);

        let composed = compose_for_display(&set);

        let order: Vec<(&str, &str, usize)> = composed
            .ranked
            .iter()
            .map(|r| (r.category.as_str(), r.design.id.as_str(), r.position))
            .collect();
        assert_eq!(
            order,
            vec![
                ("recommended", "U1", 1),
                ("recommended", "r2", 2),
                ("partial", "p1", 3),
                ("generic", "g1", 4),
            ]
        );
        assert_eq!(ids(&composed.buckets[1].designs), vec!["p1"]);
        assert_eq!(ids(&composed.buckets[2].designs), vec!["g1"]);
    }

    #[test]
    fn test_compose_keeps_empty_buckets_in_place() {
        let set = SearchResultSet::new(vec![
            bucket("recommended", &[]),
            bucket("partial", &["a"]),
            bucket("generic", &["a"]),
        ]);

        let composed = compose_for_display(&set);
        assert_eq!(composed.buckets.len(), 3);
        assert!(composed.buckets[2].is_empty());
        assert_eq!(composed.len(), 1);
        assert_eq!(composed.designs_in("partial").len(), 1);
    }

    #[test]
    fn test_flatten_in_bucket_order() {
        let set = SearchResultSet::new(vec![bucket("recommended", &["a"]), bucket("generic", &["b", "a"])]);
        assert_eq!(ids(&flatten(&set)), vec!["a", "b", "a"]);
    }
}
