//! Listing pagination state.

use crate::catalog::RawPagination;

/// Normalised pagination for the listing page.
///
/// Invariants: `page >= 1`, `total_pages >= 1`, and `has_next` is false once
/// `page >= total_pages` unless the API explicitly says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
            has_next: false,
            total: 0,
        }
    }
}

impl Pagination {
    /// Normalise an API pagination block.
    ///
    /// `default_total_pages` stands in for a missing `totalPages`; a missing
    /// total falls back to `totalCount`, then to the number of products
    /// actually received.
    #[must_use]
    pub fn from_raw(raw: &RawPagination, product_count: usize, default_total_pages: u32) -> Self {
        let page = raw.page.unwrap_or(1).max(1);
        let total_pages = raw.total_pages.unwrap_or(default_total_pages).max(1);
        let has_next = raw.has_next.unwrap_or(page < total_pages);
        let total = raw
            .total
            .or(raw.total_count)
            .unwrap_or_else(|| u64::try_from(product_count).unwrap_or(u64::MAX));

        Self {
            page,
            total_pages,
            has_next,
            total,
        }
    }

    /// Page number to request next.
    #[must_use]
    pub const fn next_page(&self) -> u32 {
        self.page.saturating_add(1)
    }
}
