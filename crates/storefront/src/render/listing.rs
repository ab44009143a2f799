//! Listing page markup.

use askama::Template;

use super::{Endpoints, ProductCard};
use crate::catalog::Product;
use crate::filters;
use crate::listing::{Filters, LIMIT_OPTIONS, Pagination, SortOrder};
use crate::page::ListingView;
use crate::router::BasePath;

struct SelectOption {
    value: String,
    label: String,
    selected: bool,
}

struct CategoryLink {
    label: String,
    href: String,
    active: bool,
}

/// Search form state shared by the loading and loaded listing.
struct SearchForm {
    action: String,
    search: String,
    category1: String,
    category2: String,
    limits: Vec<SelectOption>,
    sorts: Vec<SelectOption>,
}

impl SearchForm {
    fn new(filters: &Filters, base: &BasePath) -> Self {
        Self {
            action: base.join("/"),
            search: filters.search.clone(),
            category1: filters.category1.clone(),
            category2: filters.category2.clone(),
            limits: LIMIT_OPTIONS
                .iter()
                .map(|limit| SelectOption {
                    value: limit.to_string(),
                    label: format!("{limit} per page"),
                    selected: *limit == filters.limit.get(),
                })
                .collect(),
            sorts: SortOrder::ALL
                .iter()
                .map(|sort| SelectOption {
                    value: sort.as_str().to_string(),
                    label: sort.label().to_string(),
                    selected: *sort == filters.sort,
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/listing_loading.html")]
struct ListingLoadingTemplate {
    form: SearchForm,
    skeletons: usize,
}

#[derive(Template)]
#[template(path = "pages/listing.html")]
struct ListingTemplate {
    form: SearchForm,
    endpoints: Endpoints,
    reset_href: String,
    crumbs: Vec<CategoryLink>,
    categories: Vec<CategoryLink>,
    total: u64,
    cards: String,
    is_empty: bool,
    has_next: bool,
}

#[derive(Template)]
#[template(path = "partials/product_cards.html")]
struct ProductCardsTemplate {
    cards: Vec<ProductCard>,
    add_href: String,
}

#[derive(Template)]
#[template(path = "partials/scroll_append.html")]
struct ScrollAppendTemplate {
    cards: String,
    total: u64,
    has_next: bool,
}

/// Placeholder shown while a listing loads.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn listing_loading(filters: &Filters, base: &BasePath) -> askama::Result<String> {
    ListingLoadingTemplate {
        form: SearchForm::new(filters, base),
        skeletons: 4,
    }
    .render()
}

/// Grid cards for `products`.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn product_cards(products: &[Product], base: &BasePath) -> askama::Result<String> {
    ProductCardsTemplate {
        cards: products.iter().map(|p| ProductCard::new(p, base)).collect(),
        add_href: base.join("/cart/add"),
    }
    .render()
}

/// Loaded listing page.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn listing(view: &ListingView, base: &BasePath) -> askama::Result<String> {
    let filters = &view.filters;

    // Breadcrumb: All › category1 › category2
    let mut crumbs = Vec::new();
    if !filters.category1.is_empty() {
        crumbs.push(CategoryLink {
            label: filters.category1.clone(),
            href: filters.with_category1(&filters.category1).href(base),
            active: filters.category2.is_empty(),
        });
        if !filters.category2.is_empty() {
            crumbs.push(CategoryLink {
                label: filters.category2.clone(),
                href: filters.href(base),
                active: true,
            });
        }
    }

    // Top-level buttons until a category1 is chosen, then its children.
    let categories = if filters.category1.is_empty() {
        view.categories
            .category1s()
            .map(|name| CategoryLink {
                label: name.to_string(),
                href: filters.with_category1(name).href(base),
                active: false,
            })
            .collect()
    } else {
        view.categories
            .category2s(&filters.category1)
            .iter()
            .map(|name| CategoryLink {
                label: name.clone(),
                href: filters.with_category2(&filters.category1, name).href(base),
                active: *name == filters.category2,
            })
            .collect()
    };

    ListingTemplate {
        form: SearchForm::new(filters, base),
        endpoints: Endpoints::new(base),
        reset_href: filters.without_categories().href(base),
        crumbs,
        categories,
        total: view.pagination.total,
        cards: product_cards(&view.products, base)?,
        is_empty: view.products.is_empty(),
        has_next: view.pagination.has_next,
    }
    .render()
}

/// Out-of-band update for one infinite-scroll page: new cards, the updated
/// count, and the end marker once the last page is in.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn scroll_append(
    products: &[Product],
    pagination: &Pagination,
    base: &BasePath,
) -> askama::Result<String> {
    ScrollAppendTemplate {
        cards: product_cards(products, base)?,
        total: pagination.total,
        has_next: pagination.has_next,
    }
    .render()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::CategoryTree;

    fn product(id: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "productId": id,
            "title": format!("Product {id}"),
            "lprice": 12500,
            "brand": "",
            "maker": "Maker",
        }))
        .unwrap()
    }

    fn view(filters: Filters, has_next: bool) -> ListingView {
        ListingView {
            filters,
            products: vec![product("1"), product("2")],
            pagination: Pagination {
                page: 1,
                total_pages: 3,
                has_next,
                total: 1234,
            },
            categories: CategoryTree::from_entries([
                ("디지털/가전", vec!["태블릿PC"]),
                ("생활/건강", vec!["생활용품", "주방용품"]),
            ]),
        }
    }

    #[test]
    fn test_listing_markup() {
        let markup = listing(&view(Filters::default(), true), &BasePath::root()).unwrap();
        assert!(markup.contains(r#"data-page="listing""#));
        assert!(markup.contains("12,500원"));
        assert!(markup.contains("1,234"));
        assert!(markup.contains(r#"href="/product/1""#));
        assert!(markup.contains(r#"id="scroll-sentinel""#));
        // Maker stands in for a missing brand.
        assert!(markup.contains("Maker"));
        // Top-level category buttons only.
        assert!(markup.contains("디지털/가전"));
        assert!(!markup.contains("주방용품"));
    }

    #[test]
    fn test_category_children_shown_under_category1() {
        let filters = Filters::default().with_category1("생활/건강");
        let markup = listing(&view(filters, false), &BasePath::root()).unwrap();
        assert!(markup.contains("주방용품"));
        assert!(!markup.contains("태블릿PC"));
        assert!(!markup.contains(r#"id="scroll-sentinel""#));
    }

    #[test]
    fn test_loading_keeps_search_text() {
        let filters = Filters {
            search: "젤리".to_string(),
            ..Filters::default()
        };
        let markup = listing_loading(&filters, &BasePath::root()).unwrap();
        assert!(markup.contains(r#"data-page="listing-loading""#));
        assert!(markup.contains("젤리"));
    }

    #[test]
    fn test_scroll_append_marks_end() {
        let last = Pagination {
            page: 3,
            total_pages: 3,
            has_next: false,
            total: 6,
        };
        let markup = scroll_append(&[product("9")], &last, &BasePath::root()).unwrap();
        assert!(markup.contains("Product 9"));
        assert!(markup.contains(r#"id="scroll-end""#));

        let more = Pagination {
            has_next: true,
            ..last
        };
        let markup = scroll_append(&[product("9")], &more, &BasePath::root()).unwrap();
        assert!(!markup.contains(r#"id="scroll-end""#));
    }
}
