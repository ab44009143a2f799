//! HTTP implementation of [`CatalogSource`].

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use pocket_mall_core::ProductId;

use super::{CatalogError, CatalogSource, CategoryTree, Product, ProductPage};
use crate::config::CatalogConfig;
use crate::listing::Filters;

/// Client for the catalog API.
///
/// Cheaply cloneable; the category tree is cached for the lifetime of the
/// process once it has loaded successfully.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    categories: Cache<(), CategoryTree>,
}

impl CatalogClient {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| CatalogError::Api {
                    status: 0,
                    message: format!("Invalid API token format: {e}"),
                })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        // `Url::join` replaces the last path segment unless the base ends in '/'.
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url,
                categories: Cache::builder().max_capacity(1).build(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// GET a JSON document.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.path().to_string()));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            CatalogError::Parse(e)
        })
    }

    async fn fetch_categories(&self) -> Result<CategoryTree, CatalogError> {
        let url = self.endpoint("api/categories")?;
        self.get_json(url).await
    }
}

impl CatalogSource for CatalogClient {
    #[instrument(skip(self, filters), fields(page = page, search = %filters.search))]
    async fn products(&self, filters: &Filters, page: u32) -> Result<ProductPage, CatalogError> {
        let mut url = self.endpoint("api/products")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.max(1).to_string());
            for (key, value) in filters.query_pairs() {
                query.append_pair(key, &value);
            }
        }

        let page: ProductPage = self.get_json(url).await?;
        debug!(count = page.products.len(), "Fetched product page");
        Ok(page)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let path = format!("api/products/{}", urlencoding::encode(id.as_str()));
        let url = self.endpoint(&path)?;
        self.get_json(url).await
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<CategoryTree, CatalogError> {
        // `try_get_with` coalesces concurrent loads and never caches errors.
        self.inner
            .categories
            .try_get_with((), self.fetch_categories())
            .await
            .map_err(CatalogError::Shared)
    }
}
