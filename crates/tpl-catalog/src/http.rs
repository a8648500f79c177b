use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tpl_core::SearchResultSet;
use tracing::debug;

use crate::client::{CatalogClient, CatalogPage, QueryContext};
use crate::error::{CatalogError, Result};
use crate::wire::{self, KeywordQuery, PageQuery};

/// Options for [`HttpCatalogClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub search_path: String,
    pub pages_path: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            search_path: "templates".to_string(),
            pages_path: "all-templates".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: "tpl/1.0 (template search)".to_string(),
        }
    }
}

/// Catalog client speaking JSON over HTTP POST
pub struct HttpCatalogClient {
    client: reqwest::Client,
    search_url: String,
    pages_url: String,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(options.user_agent)
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            client,
            search_url: join_url(base_url, &options.search_path),
            pages_url: join_url(base_url, &options.pages_path),
        })
    }

    async fn post(&self, url: &str, body: &impl Serialize) -> Result<Vec<u8>> {
        let response = self.client.post(url).json(body).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn search_by_keyword(
        &self,
        keyword: &str,
        context: &QueryContext,
        cancel: &CancellationToken,
    ) -> Result<SearchResultSet> {
        let query = KeywordQuery {
            keyword,
            business_name: &context.business_name,
            page_builder: &context.page_builder,
        };

        // Dropping the request future aborts the connection
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CatalogError::Cancelled),
            body = self.post(&self.search_url, &query) => body?,
        };

        let set = wire::decode_keyword_response(&body)?;
        debug!(keyword, designs = set.design_count(), "keyword search answered");
        Ok(set)
    }

    async fn fetch_page(
        &self,
        page: u32,
        context: &QueryContext,
        page_size: u32,
    ) -> Result<CatalogPage> {
        let query = PageQuery {
            business_name: &context.business_name,
            page_builder: &context.page_builder,
            per_page: page_size,
            page,
        };

        let body = self.post(&self.pages_url, &query).await?;
        let catalog_page = wire::decode_page_response(&body)?;
        debug!(
            page,
            last_page = catalog_page.last_page,
            designs = catalog_page.buckets.design_count(),
            "catalog page answered"
        );
        Ok(catalog_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h/api/", "/templates"), "http://h/api/templates");
        assert_eq!(join_url("http://h/api", "templates"), "http://h/api/templates");
    }
}
