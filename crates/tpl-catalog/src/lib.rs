//! Remote template catalog access
//!
//! - [`CatalogClient`]: the seam the search engine talks to
//! - [`HttpCatalogClient`]: JSON-over-HTTP implementation

pub mod client;
pub mod error;
pub mod http;
mod wire;

pub use client::{CatalogClient, CatalogPage, QueryContext};
pub use error::{CatalogError, Result};
pub use http::{ClientOptions, HttpCatalogClient};
