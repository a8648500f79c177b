//! Error types for tpl-catalog

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// The request was aborted because its search generation was cancelled
    #[error("Request cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {url}")]
    Status { status: u16, url: String },

    /// The catalog answered but reported a failure
    #[error("{0}")]
    Service(String),

    #[error("Invalid catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }
}
