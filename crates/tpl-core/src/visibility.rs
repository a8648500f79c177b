use std::collections::BTreeSet;

use crate::design::{CategoryBucket, SearchResultSet};

/// Removes designs the current site setup must not offer
///
/// Built once from configuration and applied to every catalog response
/// before it is merged anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityFilter {
    pub hide_premium: bool,
    pub hide_features: BTreeSet<String>,
}

impl VisibilityFilter {
    pub fn new<I, S>(hide_premium: bool, hide_features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hide_premium,
            hide_features: hide_features.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the filter can never remove anything
    pub fn is_passthrough(&self) -> bool {
        !self.hide_premium && self.hide_features.is_empty()
    }

    pub fn filter(&self, set: SearchResultSet) -> SearchResultSet {
        if self.is_passthrough() {
            return set;
        }

        set.buckets
            .into_iter()
            .map(|bucket| CategoryBucket {
                designs: bucket
                    .designs
                    .into_iter()
                    .filter(|design| {
                        !(self.hide_premium && design.is_premium)
                            && !self.hide_features.iter().any(|f| design.has_feature(f))
                    })
                    .collect(),
                ..bucket
            })
            .collect::<Vec<_>>()
            .into()
    }
}
