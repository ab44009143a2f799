//! Domain types for the catalog API.
//!
//! These mirror the JSON payloads of the product API closely, with lenient
//! decoding: optional fields may be missing or `null`, and prices may arrive
//! as numbers or numeric strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use pocket_mall_core::{Price, ProductId};

// =============================================================================
// Product Types
// =============================================================================

/// A catalog product.
///
/// Listing responses carry the summary fields; the detail endpoint fills in
/// `description`, `rating`, `review_count` and `stock` as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    /// Lowest offered price.
    #[serde(rename = "lprice", default, deserialize_with = "null_as_default")]
    pub price: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub maker: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mall_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category1: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category2: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category3: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category4: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u64>,
    #[serde(default)]
    pub stock: Option<u64>,
}

// =============================================================================
// Listing Types
// =============================================================================

/// Pagination block as reported by the API.
///
/// Every field is optional; normalisation happens in
/// [`crate::listing::Pagination::from_raw`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub has_next: Option<bool>,
}

/// One page of the product listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pagination: RawPagination,
    /// Some API versions inline the category tree into listing responses.
    #[serde(default)]
    pub categories: Option<CategoryTree>,
}

// =============================================================================
// Category Types
// =============================================================================

/// Two-level category tree: `category1 → [category2]`.
///
/// The API encodes it as nested objects (`{"생활/건강": {"생활용품": {}}}`);
/// only the keys matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, BTreeMap<String, serde_json::Value>>")]
pub struct CategoryTree {
    entries: BTreeMap<String, Vec<String>>,
}

impl CategoryTree {
    /// Build a tree from `(category1, category2s)` pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(top, subs)| (top.into(), subs.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    /// Top-level category names in display order.
    pub fn category1s(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Second-level names under `category1`; empty when unknown.
    #[must_use]
    pub fn category2s(&self, category1: &str) -> &[String] {
        self.entries.get(category1).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, category1: &str) -> bool {
        self.entries.contains_key(category1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, BTreeMap<String, serde_json::Value>>> for CategoryTree {
    fn from(raw: BTreeMap<String, BTreeMap<String, serde_json::Value>>) -> Self {
        Self {
            entries: raw
                .into_iter()
                .map(|(top, subs)| (top, subs.into_keys().collect()))
                .collect(),
        }
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
