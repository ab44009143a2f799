//! Listing filters: page size, sort order, search text and categories.

use std::fmt::Write as _;

use serde::Deserialize;

use crate::router::BasePath;

/// Page sizes offered in the listing UI.
pub const LIMIT_OPTIONS: [u32; 4] = [10, 20, 50, 100];

/// Number of products requested per page. Always one of [`LIMIT_OPTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageLimit(u32);

impl PageLimit {
    /// Accept only the offered page sizes.
    #[must_use]
    pub fn new(value: u32) -> Option<Self> {
        LIMIT_OPTIONS.contains(&value).then_some(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        Self(20)
    }
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub const ALL: [Self; 4] = [Self::PriceAsc, Self::PriceDesc, Self::NameAsc, Self::NameDesc];

    /// Wire value used by the catalog API and in page URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
            Self::NameAsc => "Name: A to Z",
            Self::NameDesc => "Name: Z to A",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sort| sort.as_str() == value)
    }
}

/// Raw listing query string. Everything is optional and parsed leniently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
    pub category1: Option<String>,
    pub category2: Option<String>,
}

/// Active listing filters.
///
/// `category2` is only meaningful under a `category1`; constructors keep it
/// empty otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filters {
    pub limit: PageLimit,
    pub sort: SortOrder,
    pub search: String,
    pub category1: String,
    pub category2: String,
}

impl Filters {
    /// Build filters from a query string, replacing invalid values with defaults.
    #[must_use]
    pub fn from_query(query: &ListingQuery) -> Self {
        let limit = query
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .and_then(PageLimit::new)
            .unwrap_or_default();
        let sort = query
            .sort
            .as_deref()
            .and_then(|raw| SortOrder::parse(raw.trim()))
            .unwrap_or_default();

        Self {
            limit,
            sort,
            search: clean(query.search.as_deref()),
            category1: clean(query.category1.as_deref()),
            category2: clean(query.category2.as_deref()),
        }
        .normalized()
    }

    /// Clear `category2` when no `category1` is set.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.category1.is_empty() {
            self.category2.clear();
        }
        self
    }

    /// Same filters narrowed to a top-level category (drops any `category2`).
    #[must_use]
    pub fn with_category1(&self, category1: &str) -> Self {
        Self {
            category1: category1.to_owned(),
            category2: String::new(),
            ..self.clone()
        }
        .normalized()
    }

    /// Same filters narrowed to a second-level category.
    #[must_use]
    pub fn with_category2(&self, category1: &str, category2: &str) -> Self {
        Self {
            category1: category1.to_owned(),
            category2: category2.to_owned(),
            ..self.clone()
        }
        .normalized()
    }

    /// Same filters without any category.
    #[must_use]
    pub fn without_categories(&self) -> Self {
        Self {
            category1: String::new(),
            category2: String::new(),
            ..self.clone()
        }
    }

    /// Query parameters for the catalog API (page excluded).
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.get().to_string()),
            ("sort", self.sort.as_str().to_string()),
        ];
        for (key, value) in [
            ("search", &self.search),
            ("category1", &self.category1),
            ("category2", &self.category2),
        ] {
            if !value.is_empty() {
                pairs.push((key, value.clone()));
            }
        }
        pairs
    }

    /// Listing page URL for these filters. Default values are left out.
    #[must_use]
    pub fn href(&self, base: &BasePath) -> String {
        let defaults = Self::default();
        let mut query = String::new();
        for (key, value) in self.query_pairs() {
            let is_default = match key {
                "limit" => self.limit == defaults.limit,
                "sort" => self.sort == defaults.sort,
                _ => false,
            };
            if is_default {
                continue;
            }
            let sep = if query.is_empty() { '?' } else { '&' };
            let _ = write!(query, "{sep}{key}={}", urlencoding::encode(&value));
        }
        format!("{}{query}", base.join("/"))
    }
}

fn clean(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListingQuery {
        let mut q = ListingQuery::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "limit" => q.limit = value,
                "sort" => q.sort = value,
                "search" => q.search = value,
                "category1" => q.category1 = value,
                "category2" => q.category2 = value,
                _ => {}
            }
        }
        q
    }

    #[test]
    fn test_defaults() {
        let filters = Filters::from_query(&ListingQuery::default());
        assert_eq!(filters.limit.get(), 20);
        assert_eq!(filters.sort, SortOrder::PriceAsc);
        assert!(filters.search.is_empty());
    }

    #[test]
    fn test_invalid_limit_and_sort_fall_back() {
        let filters = Filters::from_query(&query(&[("limit", "7"), ("sort", "random")]));
        assert_eq!(filters, Filters::default());
    }

    #[test]
    fn test_valid_values_are_kept() {
        let filters = Filters::from_query(&query(&[
            ("limit", "50"),
            ("sort", "name_desc"),
            ("search", "  젤리 "),
        ]));
        assert_eq!(filters.limit.get(), 50);
        assert_eq!(filters.sort, SortOrder::NameDesc);
        assert_eq!(filters.search, "젤리");
    }

    #[test]
    fn test_category2_requires_category1() {
        let filters = Filters::from_query(&query(&[("category2", "생활용품")]));
        assert!(filters.category2.is_empty());

        let filters = Filters::from_query(&query(&[
            ("category1", "생활/건강"),
            ("category2", "생활용품"),
        ]));
        assert_eq!(filters.category2, "생활용품");
        assert!(filters.without_categories().category2.is_empty());
        assert!(filters.with_category1("디지털/가전").category2.is_empty());
    }

    #[test]
    fn test_query_pairs_skip_empty_values() {
        let filters = Filters {
            search: "bag".to_string(),
            ..Filters::default()
        };
        let keys: Vec<_> = filters.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["limit", "sort", "search"]);
    }

    #[test]
    fn test_href_encodes_and_omits_defaults() {
        let base = BasePath::new("/shop");
        assert_eq!(Filters::default().href(&base), "/shop");

        let filters = Filters::default().with_category1("생활/건강");
        assert_eq!(
            filters.href(&base),
            "/shop?category1=%EC%83%9D%ED%99%9C%2F%EA%B1%B4%EA%B0%95"
        );

        let filters = Filters {
            limit: PageLimit::new(10).unwrap_or_default(),
            ..Filters::default()
        };
        assert_eq!(filters.href(&BasePath::root()), "/?limit=10");
    }
}
