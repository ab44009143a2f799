//! What the shopper currently has on screen.
//!
//! The render loop writes the page here after every successful pass; the
//! cart store reads from it to resolve products on "add to cart".
//! There is one per session, so every tab of a browser shares it.

use parking_lot::Mutex;
use pocket_mall_core::ProductId;

use crate::cart::ProductLookup;
use crate::catalog::{CategoryTree, Product};
use crate::listing::{Filters, Pagination};

/// Listing page data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingView {
    pub filters: Filters,
    pub products: Vec<Product>,
    pub pagination: Pagination,
    pub categories: CategoryTree,
}

/// Detail page data.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub product: Product,
    /// Other products in the same second-level category.
    pub related: Vec<Product>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PageView {
    #[default]
    Blank,
    Listing(ListingView),
    Detail(DetailView),
}

/// Shared, lockable [`PageView`].
#[derive(Debug, Default)]
pub struct PageState {
    view: Mutex<PageView>,
}

impl PageState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, view: PageView) {
        *self.view.lock() = view;
    }

    #[must_use]
    pub fn get(&self) -> PageView {
        self.view.lock().clone()
    }

    /// Filters and pagination of the listing on screen, if any.
    #[must_use]
    pub fn listing_cursor(&self) -> Option<(Filters, Pagination)> {
        match &*self.view.lock() {
            PageView::Listing(listing) => Some((listing.filters.clone(), listing.pagination)),
            _ => None,
        }
    }

    /// Append a further page to the listing on screen.
    ///
    /// Returns the new product total, or `None` when no listing is shown.
    pub fn append(&self, products: &[Product], pagination: Pagination) -> Option<usize> {
        match &mut *self.view.lock() {
            PageView::Listing(listing) => {
                listing.products.extend_from_slice(products);
                listing.pagination = pagination;
                Some(listing.products.len())
            }
            _ => None,
        }
    }
}

impl ProductLookup for PageState {
    fn find_product(&self, id: &ProductId) -> Option<Product> {
        let view = self.view.lock();
        let found = match &*view {
            PageView::Listing(listing) => listing.products.iter().find(|p| &p.product_id == id),
            PageView::Detail(detail) => std::iter::once(&detail.product)
                .chain(detail.related.iter())
                .find(|p| &p.product_id == id),
            PageView::Blank => None,
        };
        found.cloned()
    }
}
