//! Catalog client trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tpl_core::SearchResultSet;

use crate::error::Result;

/// Business details sent with every catalog query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    pub business_name: String,
    pub business_type: String,
    /// Keywords suggested for the business, most relevant first
    pub keywords: Vec<String>,
    pub page_builder: String,
}

impl QueryContext {
    /// Keyword to search for when the user has not typed one.
    ///
    /// The business type wins unless it is the catch-all "others"; then the
    /// first suggested keyword, then the business name itself.
    pub fn initial_keyword(&self) -> String {
        let business_type = self.business_type.trim().to_lowercase();
        if !business_type.is_empty() && business_type != "others" {
            return business_type;
        }

        self.keywords
            .iter()
            .map(|k| k.trim())
            .find(|k| !k.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.business_name.clone())
    }

    pub fn with_page_builder(mut self, page_builder: impl Into<String>) -> Self {
        self.page_builder = page_builder.into();
        self
    }
}

/// One page of the unfiltered catalog listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub buckets: SearchResultSet,
    /// Last page number the catalog has for this query (1-based)
    pub last_page: u32,
}

/// Remote template catalog
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search the catalog for one keyword.
    ///
    /// Must return [`CatalogError::Cancelled`](crate::CatalogError::Cancelled)
    /// promptly once `cancel` fires.
    async fn search_by_keyword(
        &self,
        keyword: &str,
        context: &QueryContext,
        cancel: &CancellationToken,
    ) -> Result<SearchResultSet>;

    /// Fetch one page (1-based) of the full catalog listing
    async fn fetch_page(&self, page: u32, context: &QueryContext, page_size: u32)
    -> Result<CatalogPage>;
}
