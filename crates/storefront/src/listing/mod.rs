//! Listing page state: filters, pagination and infinite scroll.

pub mod filters;
pub mod pagination;
pub mod scroll;

pub use filters::{Filters, LIMIT_OPTIONS, ListingQuery, PageLimit, SortOrder};
pub use pagination::Pagination;
pub use scroll::{FetchTicket, ScrollController, ScrollMetrics};
