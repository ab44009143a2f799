//! Catalog API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`
//! - The catalog API is the source of truth for products; nothing is synced
//!   locally
//! - The category tree is cached in-process via `moka` after the first
//!   successful load, and concurrent first loads share one request
//!
//! # Endpoints
//!
//! ```text
//! GET /api/products?page&limit&search&category1&category2&sort
//! GET /api/products/{id}
//! GET /api/categories
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pocket_mall_storefront::catalog::{CatalogClient, CatalogSource};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let page = client.products(&Filters::default(), 1).await?;
//! let detail = client.product(&page.products[0].product_id).await?;
//! ```

mod client;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use pocket_mall_core::ProductId;

use crate::listing::Filters;

pub use client::CatalogClient;
pub use types::{CategoryTree, Product, ProductPage, RawPagination};

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Error shared by callers of a coalesced cache load.
    #[error(transparent)]
    Shared(Arc<Self>),
}

impl CatalogError {
    /// Whether the error means the requested resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Shared(inner) => inner.is_not_found(),
            _ => false,
        }
    }
}

/// Read access to the product catalog.
///
/// Implemented by [`CatalogClient`]; the render loop and infinite-scroll
/// paths are generic over it so they can run against in-memory catalogs in
/// tests.
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of the product listing.
    fn products(
        &self,
        filters: &Filters,
        page: u32,
    ) -> impl Future<Output = Result<ProductPage, CatalogError>> + Send;

    /// Fetch a single product with its detail fields.
    fn product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Fetch the category tree.
    fn categories(&self) -> impl Future<Output = Result<CategoryTree, CatalogError>> + Send;
}
