//! Page routing and the render loop.
//!
//! # Rendering
//!
//! Every navigation runs one render *pass*:
//!
//! 1. Tag the pass with a new generation and unbind infinite scroll
//! 2. Paint the loading placeholder
//! 3. Fetch from the catalog
//! 4. Discard the result if a newer pass has started
//! 5. Store the page, paint it, and bind infinite scroll when more pages exist
//!
//! Fetch failures paint an error view with a retry link and raise an error
//! toast. Markup goes to a [`Screen`]; route handlers use a [`PageFrame`] and
//! send its final paint to the browser.

use std::sync::Arc;

use axum::http::HeaderMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use pocket_mall_core::ProductId;

use crate::catalog::{CatalogError, CatalogSource, Product, RawPagination};
use crate::listing::{Filters, Pagination, ScrollController, ScrollMetrics};
use crate::page::{DetailView, ListingView, PageState, PageView};
use crate::render;
use crate::toast::{ToastKind, Toaster};

// =============================================================================
// Paths
// =============================================================================

/// Path prefix the storefront is mounted under. Stored without a trailing
/// slash; the root prefix is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePath(String);

impl BasePath {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let path = collapse(raw);
        if path == "/" {
            Self::root()
        } else {
            Self(path)
        }
    }

    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Prefix as a mount point (`/` for the root).
    #[must_use]
    pub fn as_str(&self) -> &str {
        if self.is_root() { "/" } else { &self.0 }
    }

    /// Absolute path for an in-app path such as `/product/1`. The app root
    /// is the prefix itself, without a trailing slash.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        if path == "/" {
            self.as_str().to_owned()
        } else if path.starts_with('/') {
            format!("{}{path}", self.0)
        } else {
            format!("{}/{path}", self.0)
        }
    }

    /// Remove the prefix from a request path. Paths outside the prefix are
    /// returned unchanged.
    #[must_use]
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        if self.is_root() {
            return path;
        }
        match path.strip_prefix(self.0.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

/// Leading slash, no empty segments, no trailing slash.
fn collapse(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Normalise a request path relative to the base path.
#[must_use]
pub fn normalize_path(raw: &str, base: &BasePath) -> String {
    collapse(base.strip(&collapse(raw)))
}

/// Page a normalised path maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Listing,
    Detail(ProductId),
    /// Unknown path; the shopper is sent to the listing.
    Redirect,
}

impl Route {
    #[must_use]
    pub fn resolve(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Listing,
            ["product", raw_id] => urlencoding::decode(raw_id)
                .ok()
                .and_then(|id| ProductId::parse(&id).ok())
                .map_or(Self::Redirect, Self::Detail),
            _ => Self::Redirect,
        }
    }

    /// Canonical URL of the route.
    #[must_use]
    pub fn href(&self, base: &BasePath, filters: &Filters) -> String {
        match self {
            Self::Listing => filters.href(base),
            Self::Detail(id) => product_href(base, id),
            Self::Redirect => base.join("/"),
        }
    }
}

#[must_use]
pub fn product_href(base: &BasePath, id: &ProductId) -> String {
    base.join(&format!("/product/{}", urlencoding::encode(id.as_str())))
}

/// How a page was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// In-app link or form; the new URL is pushed onto the history stack and
    /// only the root container is replaced.
    Push,
    /// Initial load, reload or back/forward restore; the full document is
    /// served and history is left alone.
    Pop,
}

impl Navigation {
    /// Classify an HTMX request.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let flag = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        };
        if flag("hx-request") && !flag("hx-history-restore-request") {
            Self::Push
        } else {
            Self::Pop
        }
    }
}

// =============================================================================
// Screen
// =============================================================================

/// Root container that render passes paint into.
pub trait Screen {
    /// Replace the container's markup.
    fn paint(&mut self, markup: String);
}

/// A [`Screen`] that records every paint.
#[derive(Debug, Default)]
pub struct PageFrame {
    paints: Vec<String>,
}

impl PageFrame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn paints(&self) -> &[String] {
        &self.paints
    }

    /// Markup currently on screen.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.paints.last().map(String::as_str)
    }

    #[must_use]
    pub fn into_current(mut self) -> Option<String> {
        self.paints.pop()
    }
}

impl Screen for PageFrame {
    fn paint(&mut self, markup: String) {
        self.paints.push(markup);
    }
}

// =============================================================================
// Render Loop
// =============================================================================

/// Result of a render pass.
#[derive(Debug)]
#[must_use]
pub enum RenderOutcome {
    /// Data-bound markup is on screen.
    Painted,
    /// The fetch failed; the error view is on screen.
    Failed(CatalogError),
    /// A newer pass started; nothing was painted after the placeholder.
    Superseded,
}

/// Result of an infinite-scroll report.
#[derive(Debug)]
#[must_use]
pub enum ScrollOutcome {
    /// Not bound, already fetching, or not close enough to the bottom.
    Idle,
    /// A page was appended.
    Appended { markup: String, has_next: bool },
    /// The listing changed while the page was in flight.
    Stale,
    /// The page fetch failed; a later scroll retries.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PassTag(u64);

/// Drives render passes for one shopper.
pub struct RenderLoop {
    generation: Mutex<u64>,
    base: BasePath,
    default_total_pages: u32,
    page: Arc<PageState>,
    scroll: Arc<ScrollController>,
    toaster: Toaster,
}

impl RenderLoop {
    #[must_use]
    pub fn new(
        base: BasePath,
        default_total_pages: u32,
        page: Arc<PageState>,
        scroll: Arc<ScrollController>,
        toaster: Toaster,
    ) -> Self {
        Self {
            generation: Mutex::new(0),
            base,
            default_total_pages: default_total_pages.max(1),
            page,
            scroll,
            toaster,
        }
    }

    #[must_use]
    pub fn base(&self) -> &BasePath {
        &self.base
    }

    #[must_use]
    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    fn begin(&self) -> PassTag {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.scroll.unbind();
        PassTag(*generation)
    }

    fn is_current(&self, tag: PassTag) -> bool {
        *self.generation.lock() == tag.0
    }

    /// Store the page if `tag` is still the newest pass.
    fn commit(&self, tag: PassTag, view: PageView, has_next: bool) -> bool {
        let generation = self.generation.lock();
        if *generation != tag.0 {
            return false;
        }
        self.page.set(view);
        if has_next {
            self.scroll.bind(true);
        }
        true
    }

    /// Run one render pass for `route`. `Redirect` renders the listing.
    ///
    /// # Errors
    ///
    /// Returns an error only if a template fails to render.
    pub async fn render<C, S>(
        &self,
        route: &Route,
        filters: &Filters,
        catalog: &C,
        screen: &mut S,
    ) -> Result<RenderOutcome, askama::Error>
    where
        C: CatalogSource,
        S: Screen + Send,
    {
        let tag = self.begin();
        debug!(generation = tag.0, ?route, "Render pass started");

        match route {
            Route::Listing | Route::Redirect => self.render_listing(tag, filters, catalog, screen).await,
            Route::Detail(id) => self.render_detail(tag, id, catalog, screen).await,
        }
    }

    async fn render_listing<C, S>(
        &self,
        tag: PassTag,
        filters: &Filters,
        catalog: &C,
        screen: &mut S,
    ) -> Result<RenderOutcome, askama::Error>
    where
        C: CatalogSource,
        S: Screen + Send,
    {
        screen.paint(render::listing_loading(filters, &self.base)?);

        let (products, categories) = tokio::join!(catalog.products(filters, 1), catalog.categories());
        if !self.is_current(tag) {
            return Ok(RenderOutcome::Superseded);
        }

        let page = match products {
            Ok(page) => page,
            Err(e) => {
                let retry = filters.href(&self.base);
                return self.fail(tag, e, "Failed to load products.", &retry, screen);
            }
        };

        let categories = match categories {
            Ok(tree) => tree,
            Err(e) => {
                warn!(error = %e, "Category tree unavailable");
                page.categories.clone().unwrap_or_default()
            }
        };

        let pagination = Pagination::from_raw(&page.pagination, page.products.len(), self.default_total_pages);
        let view = ListingView {
            filters: filters.clone(),
            products: page.products,
            pagination,
            categories,
        };
        let markup = render::listing(&view, &self.base)?;

        if !self.commit(tag, PageView::Listing(view), pagination.has_next) {
            return Ok(RenderOutcome::Superseded);
        }
        screen.paint(markup);
        Ok(RenderOutcome::Painted)
    }

    async fn render_detail<C, S>(
        &self,
        tag: PassTag,
        id: &ProductId,
        catalog: &C,
        screen: &mut S,
    ) -> Result<RenderOutcome, askama::Error>
    where
        C: CatalogSource,
        S: Screen + Send,
    {
        screen.paint(render::detail_loading(&self.base)?);

        let product = catalog.product(id).await;
        if !self.is_current(tag) {
            return Ok(RenderOutcome::Superseded);
        }

        let product = match product {
            Ok(product) => product,
            Err(e) => {
                let message = if e.is_not_found() {
                    "Product not found."
                } else {
                    "Failed to load the product."
                };
                let retry = product_href(&self.base, id);
                return self.fail(tag, e, message, &retry, screen);
            }
        };

        let related = related_products(catalog, &product).await;
        let view = DetailView { product, related };
        let markup = render::detail(&view, &self.base)?;

        if !self.commit(tag, PageView::Detail(view), false) {
            return Ok(RenderOutcome::Superseded);
        }
        screen.paint(markup);
        Ok(RenderOutcome::Painted)
    }

    fn fail<S: Screen>(
        &self,
        tag: PassTag,
        error: CatalogError,
        message: &str,
        retry_href: &str,
        screen: &mut S,
    ) -> Result<RenderOutcome, askama::Error> {
        let markup = render::error_view(message, retry_href)?;
        if !self.commit(tag, PageView::Blank, false) {
            return Ok(RenderOutcome::Superseded);
        }
        warn!(error = %error, "Render pass failed");
        self.toaster.show(message, ToastKind::Error);
        screen.paint(markup);
        Ok(RenderOutcome::Failed(error))
    }

    /// Handle a scroll report from the listing page: fetch and append the next
    /// page when the controller allows it.
    ///
    /// # Errors
    ///
    /// Returns an error only if a template fails to render.
    pub async fn load_more<C: CatalogSource>(
        &self,
        catalog: &C,
        metrics: &ScrollMetrics,
    ) -> Result<ScrollOutcome, askama::Error> {
        let Some(ticket) = self.scroll.on_scroll(metrics) else {
            return Ok(ScrollOutcome::Idle);
        };
        let Some((filters, current)) = self.page.listing_cursor() else {
            self.scroll.abort(ticket);
            return Ok(ScrollOutcome::Idle);
        };

        let requested = current.next_page();
        debug!(page = requested, "Fetching next listing page");
        let page = match catalog.products(&filters, requested).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, page = requested, "Next page fetch failed");
                self.scroll.abort(ticket);
                self.toaster.show("Failed to load more products.", ToastKind::Error);
                return Ok(ScrollOutcome::Failed);
            }
        };

        let raw = RawPagination {
            page: page.pagination.page.or(Some(requested)),
            ..page.pagination.clone()
        };
        let pagination = Pagination::from_raw(&raw, page.products.len(), self.default_total_pages);

        {
            // Render passes start and commit under the same lock.
            let _generation = self.generation.lock();
            if !self.scroll.finish(ticket, pagination.has_next) {
                return Ok(ScrollOutcome::Stale);
            }
            if self.page.append(&page.products, pagination).is_none() {
                return Ok(ScrollOutcome::Stale);
            }
        }

        let markup = render::scroll_append(&page.products, &pagination, &self.base)?;
        Ok(ScrollOutcome::Appended {
            markup,
            has_next: pagination.has_next,
        })
    }
}

/// Products sharing the second-level category, excluding `product` itself.
/// Failures only cost the related section.
async fn related_products<C: CatalogSource>(catalog: &C, product: &Product) -> Vec<Product> {
    if product.category2.is_empty() {
        return Vec::new();
    }
    let filters = Filters::default().with_category2(&product.category1, &product.category2);
    match catalog.products(&filters, 1).await {
        Ok(page) => page
            .products
            .into_iter()
            .filter(|p| p.product_id != product.product_id)
            .collect(),
        Err(e) => {
            warn!(error = %e, product_id = %product.product_id, "Related products unavailable");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::http::HeaderValue;
    use serde_json::json;

    use super::*;
    use crate::catalog::{CategoryTree, ProductPage};

    // -------------------------------------------------------------------------
    // Paths
    // -------------------------------------------------------------------------

    #[test]
    fn test_base_path() {
        assert!(BasePath::new("/").is_root());
        assert!(BasePath::new("").is_root());
        assert_eq!(BasePath::new("shop/").as_str(), "/shop");
        assert_eq!(BasePath::new("//shop//").join("/product/1"), "/shop/product/1");
        assert_eq!(BasePath::root().join("/"), "/");
        assert_eq!(BasePath::new("/shop").join("/"), "/shop");
    }

    #[test]
    fn test_normalize_path() {
        let base = BasePath::new("/shop");
        assert_eq!(normalize_path("/shop", &base), "/");
        assert_eq!(normalize_path("/shop/", &base), "/");
        assert_eq!(normalize_path("//shop//product//42/", &base), "/product/42");
        assert_eq!(normalize_path("/shopping", &base), "/shopping");
        assert_eq!(normalize_path("product/42", &BasePath::root()), "/product/42");
    }

    #[test]
    fn test_resolve() {
        assert_eq!(Route::resolve("/"), Route::Listing);
        assert_eq!(
            Route::resolve("/product/85067212996"),
            Route::Detail(ProductId::from("85067212996"))
        );
        assert_eq!(Route::resolve("/product"), Route::Redirect);
        assert_eq!(Route::resolve("/product/1/extra"), Route::Redirect);
        assert_eq!(Route::resolve("/cart"), Route::Redirect);
    }

    #[test]
    fn test_route_href() {
        let base = BasePath::new("/shop");
        let filters = Filters::default();
        assert_eq!(Route::Listing.href(&base, &filters), "/shop");
        assert_eq!(
            Route::Detail(ProductId::from("7")).href(&base, &filters),
            "/shop/product/7"
        );
        assert_eq!(Route::Redirect.href(&base, &filters), "/shop");
    }

    #[test]
    fn test_navigation_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(Navigation::from_headers(&headers), Navigation::Pop);

        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert_eq!(Navigation::from_headers(&headers), Navigation::Push);

        headers.insert("hx-history-restore-request", HeaderValue::from_static("true"));
        assert_eq!(Navigation::from_headers(&headers), Navigation::Pop);
    }

    // -------------------------------------------------------------------------
    // Render loop
    // -------------------------------------------------------------------------

    fn product(id: &str, category2: &str) -> Product {
        serde_json::from_value(json!({
            "productId": id,
            "title": format!("Product {id}"),
            "lprice": "1000",
            "category1": "생활/건강",
            "category2": category2,
        }))
        .unwrap()
    }

    #[derive(Default)]
    struct FakeCatalog {
        pages: HashMap<u32, Vec<Product>>,
        total_pages: u32,
        delays: HashMap<String, u64>,
        fail_products: bool,
        fail_categories: bool,
    }

    impl FakeCatalog {
        fn with_pages(total_pages: u32) -> Self {
            let pages = (1..=total_pages)
                .map(|page| {
                    let products = (0..2).map(|i| product(&format!("{page}-{i}"), "생활용품")).collect();
                    (page, products)
                })
                .collect();
            Self {
                pages,
                total_pages,
                ..Self::default()
            }
        }
    }

    impl CatalogSource for FakeCatalog {
        async fn products(&self, filters: &Filters, page: u32) -> Result<ProductPage, CatalogError> {
            if let Some(ms) = self.delays.get(&filters.search) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.fail_products {
                return Err(CatalogError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(ProductPage {
                products: self.pages.get(&page).cloned().unwrap_or_default(),
                pagination: RawPagination {
                    page: Some(page),
                    total_pages: Some(self.total_pages),
                    total: Some(u64::from(self.total_pages) * 2),
                    ..RawPagination::default()
                },
                categories: None,
            })
        }

        async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
            self.pages
                .values()
                .flatten()
                .find(|p| &p.product_id == id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(id.to_string()))
        }

        async fn categories(&self) -> Result<CategoryTree, CatalogError> {
            if self.fail_categories {
                return Err(CatalogError::NotFound("categories".to_string()));
            }
            Ok(CategoryTree::from_entries([("생활/건강", vec!["생활용품"])]))
        }
    }

    struct Harness {
        render_loop: RenderLoop,
        page: Arc<PageState>,
        scroll: Arc<ScrollController>,
        toaster: Toaster,
    }

    fn harness() -> Harness {
        let page = Arc::new(PageState::new());
        let scroll = Arc::new(ScrollController::default());
        let toaster = Toaster::new();
        Harness {
            render_loop: RenderLoop::new(BasePath::root(), 1, page.clone(), scroll.clone(), toaster.clone()),
            page,
            scroll,
            toaster,
        }
    }

    fn near_bottom() -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: 900.0,
            viewport_height: 800.0,
            document_height: 1800.0,
        }
    }

    #[tokio::test]
    async fn test_listing_paints_loading_then_content() {
        let h = harness();
        let catalog = FakeCatalog::with_pages(3);
        let mut frame = PageFrame::new();

        let outcome = h
            .render_loop
            .render(&Route::Listing, &Filters::default(), &catalog, &mut frame)
            .await
            .unwrap();

        assert!(matches!(outcome, RenderOutcome::Painted));
        assert_eq!(frame.paints().len(), 2);
        assert!(frame.paints()[0].contains(r#"data-page="listing-loading""#));
        assert!(frame.current().unwrap().contains(r#"data-page="listing""#));
        assert!(frame.current().unwrap().contains("Product 1-0"));
        assert!(h.scroll.is_bound(), "more pages remain");
    }

    #[tokio::test]
    async fn test_single_page_listing_leaves_scroll_unbound() {
        let h = harness();
        let catalog = FakeCatalog::with_pages(1);
        let mut frame = PageFrame::new();
        let _ = h
            .render_loop
            .render(&Route::Listing, &Filters::default(), &catalog, &mut frame)
            .await
            .unwrap();
        assert!(!h.scroll.is_bound());
    }

    #[tokio::test]
    async fn test_category_failure_is_not_fatal() {
        let h = harness();
        let catalog = FakeCatalog {
            fail_categories: true,
            ..FakeCatalog::with_pages(1)
        };
        let mut frame = PageFrame::new();
        let outcome = h
            .render_loop
            .render(&Route::Listing, &Filters::default(), &catalog, &mut frame)
            .await
            .unwrap();
        assert!(matches!(outcome, RenderOutcome::Painted));
        assert!(h.toaster.board().toasts.is_empty());
    }

    #[tokio::test]
    async fn test_failure_paints_error_view_and_toast() {
        let h = harness();
        let catalog = FakeCatalog {
            fail_products: true,
            ..FakeCatalog::with_pages(1)
        };
        let mut frame = PageFrame::new();

        let outcome = h
            .render_loop
            .render(&Route::Listing, &Filters::default(), &catalog, &mut frame)
            .await
            .unwrap();

        assert!(matches!(outcome, RenderOutcome::Failed(_)));
        assert!(frame.current().unwrap().contains(r#"data-page="error""#));
        let board = h.toaster.board();
        assert_eq!(board.toasts.len(), 1);
        assert_eq!(board.toasts[0].kind, ToastKind::Error);
        assert_eq!(h.page.get(), PageView::Blank);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_pass_supersedes_older() {
        let h = harness();
        let mut catalog = FakeCatalog::with_pages(2);
        catalog.delays.insert("slow".to_string(), 100);
        catalog.delays.insert("fast".to_string(), 10);

        let slow = Filters {
            search: "slow".to_string(),
            ..Filters::default()
        };
        let fast = Filters {
            search: "fast".to_string(),
            ..Filters::default()
        };
        let (mut slow_frame, mut fast_frame) = (PageFrame::new(), PageFrame::new());

        let (slow_outcome, fast_outcome) = tokio::join!(
            h.render_loop.render(&Route::Listing, &slow, &catalog, &mut slow_frame),
            h.render_loop.render(&Route::Listing, &fast, &catalog, &mut fast_frame),
        );

        assert!(matches!(slow_outcome.unwrap(), RenderOutcome::Superseded));
        assert!(matches!(fast_outcome.unwrap(), RenderOutcome::Painted));
        assert_eq!(slow_frame.paints().len(), 1, "only the placeholder");
        assert_eq!(h.page.listing_cursor().map(|(f, _)| f.search), Some("fast".to_string()));
    }

    #[tokio::test]
    async fn test_detail_with_related_products() {
        let h = harness();
        let mut catalog = FakeCatalog::with_pages(1);
        catalog.pages.insert(1, vec![product("1", "생활용품"), product("2", "생활용품")]);
        let mut frame = PageFrame::new();

        let outcome = h
            .render_loop
            .render(&Route::Detail(ProductId::from("1")), &Filters::default(), &catalog, &mut frame)
            .await
            .unwrap();

        assert!(matches!(outcome, RenderOutcome::Painted));
        assert!(frame.paints()[0].contains(r#"data-page="detail-loading""#));
        let PageView::Detail(detail) = h.page.get() else {
            panic!("expected detail view");
        };
        assert_eq!(detail.product.product_id, ProductId::from("1"));
        let related: Vec<_> = detail.related.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(related, ["2"]);
        assert!(!h.scroll.is_bound());
    }

    #[tokio::test]
    async fn test_missing_product_fails() {
        let h = harness();
        let catalog = FakeCatalog::with_pages(1);
        let mut frame = PageFrame::new();
        let outcome = h
            .render_loop
            .render(&Route::Detail(ProductId::from("404")), &Filters::default(), &catalog, &mut frame)
            .await
            .unwrap();
        assert!(matches!(outcome, RenderOutcome::Failed(e) if e.is_not_found()));
        assert!(frame.current().unwrap().contains("Product not found."));
    }

    #[tokio::test]
    async fn test_load_more_appends_until_last_page() {
        let h = harness();
        let catalog = FakeCatalog::with_pages(2);
        let mut frame = PageFrame::new();
        let _ = h
            .render_loop
            .render(&Route::Listing, &Filters::default(), &catalog, &mut frame)
            .await
            .unwrap();

        let far = ScrollMetrics {
            scroll_top: 0.0,
            ..near_bottom()
        };
        assert!(matches!(
            h.render_loop.load_more(&catalog, &far).await.unwrap(),
            ScrollOutcome::Idle
        ));

        let outcome = h.render_loop.load_more(&catalog, &near_bottom()).await.unwrap();
        let ScrollOutcome::Appended { markup, has_next } = outcome else {
            panic!("expected appended page");
        };
        assert!(markup.contains("Product 2-0"));
        assert!(!has_next);
        assert!(!h.scroll.is_bound());

        let PageView::Listing(listing) = h.page.get() else {
            panic!("expected listing view");
        };
        assert_eq!(listing.products.len(), 4);
        assert_eq!(listing.pagination.page, 2);

        assert!(matches!(
            h.render_loop.load_more(&catalog, &near_bottom()).await.unwrap(),
            ScrollOutcome::Idle
        ));
    }

    #[tokio::test]
    async fn test_load_more_failure_allows_retry() {
        let h = harness();
        let mut catalog = FakeCatalog::with_pages(3);
        let mut frame = PageFrame::new();
        let _ = h
            .render_loop
            .render(&Route::Listing, &Filters::default(), &catalog, &mut frame)
            .await
            .unwrap();

        catalog.fail_products = true;
        assert!(matches!(
            h.render_loop.load_more(&catalog, &near_bottom()).await.unwrap(),
            ScrollOutcome::Failed
        ));
        assert!(h.scroll.is_bound());
        assert!(!h.scroll.is_fetching());

        catalog.fail_products = false;
        assert!(matches!(
            h.render_loop.load_more(&catalog, &near_bottom()).await.unwrap(),
            ScrollOutcome::Appended { has_next: true, .. }
        ));
    }
}
