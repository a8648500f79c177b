//! Working state of a search session

use std::fmt;

use serde::Serialize;
use tpl_core::{ComposedResults, Design, SearchResultSet, compose_for_display, flatten, merge_buckets, merge_flat};

/// Token identifying one logical search operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the live generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    #[default]
    Idle,
    Fetching,
    Settled,
    Cancelled,
}

/// Fallback pagination bookkeeping, reset with every generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    /// Next page a load-more trigger requests (1-based)
    pub current_page: u32,
    pub is_loading_page: bool,
    pub has_more_pages: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            is_loading_page: false,
            has_more_pages: false,
        }
    }
}

/// Bucketed results plus the flat de-duplicated list, in first-seen order
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateState {
    pub buckets: SearchResultSet,
    pub flat: Vec<Design>,
}

impl AggregateState {
    /// Fold one (already filtered) result set in. Returns how many designs
    /// were new to the flat list.
    pub fn absorb(&mut self, incoming: &SearchResultSet) -> usize {
        let before = self.flat.len();
        self.buckets = merge_buckets(&self.buckets, incoming);
        self.flat = merge_flat(&self.flat, &flatten(incoming));
        self.flat.len() - before
    }

    pub fn composed(&self) -> ComposedResults {
        compose_for_display(&self.buckets)
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }
}

/// Point-in-time copy of the session, for callers that poll
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub generation: Generation,
    pub phase: SearchPhase,
    pub aggregate: AggregateState,
    pub composed: ComposedResults,
    pub pagination: PaginationState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpl_core::CategoryBucket;

    fn set(buckets: &[(&str, &[&str])]) -> SearchResultSet {
        SearchResultSet::new(
            buckets
                .iter()
                .map(|(name, ids)| CategoryBucket::new(*name, ids.iter().map(|id| Design::new(*id)).collect()))
                .collect(),
        )
    }

    #[test]
    fn test_generation_is_monotonic() {
        let g = Generation::default();
        assert!(g.next() > g);
        assert_eq!(g.next().next().get(), 2);
        assert_eq!(g.next().to_string(), "#1");
    }

    #[test]
    fn test_pagination_defaults() {
        let p = PaginationState::default();
        assert_eq!(p.current_page, 1);
        assert!(!p.is_loading_page);
        assert!(!p.has_more_pages);
    }

    #[test]
    fn test_absorb_counts_new_flat_entries() {
        let mut aggregate = AggregateState::default();

        let added = aggregate.absorb(&set(&[("recommended", &["a", "b"]), ("generic", &["a", "c"])]));
        assert_eq!(added, 3);

        let added = aggregate.absorb(&set(&[("partial", &["c", "d"])]));
        assert_eq!(added, 1);

        let ids: Vec<&str> = aggregate.flat.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(aggregate.buckets.buckets.len(), 3);
        // "a" renders once, under recommended
        assert_eq!(aggregate.composed().len(), 4);
    }
}
