//! Markup rendering.
//!
//! Every function here is pure: it maps view data to an HTML string and
//! touches no shopper state. Binding (which controls talk to which endpoint)
//! lives entirely in the markup as `hx-*` attributes pointing at base-path
//! aware URLs, so re-rendering never duplicates listeners.

mod cart;
mod detail;
mod layout;
mod listing;
mod toast;

pub use cart::{cart_badge, cart_modal};
pub use detail::{detail, detail_loading};
pub use layout::{Document, error_view};
pub use listing::{listing, listing_loading, product_cards, scroll_append};
pub use toast::toasts;

use pocket_mall_core::ProductId;

use crate::catalog::Product;
use crate::router::{BasePath, product_href};

/// Product card shared by the listing grid and the related-products strip.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub title: String,
    pub image: String,
    pub brand: String,
    pub price_label: String,
    pub href: String,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, base: &BasePath) -> Self {
        Self {
            id: product.product_id.to_string(),
            title: product.title.clone(),
            image: product.image.clone(),
            brand: if product.brand.is_empty() {
                product.maker.clone()
            } else {
                product.brand.clone()
            },
            price_label: product.price.label(),
            href: product_href(base, &product.product_id),
        }
    }
}

/// URLs of the shopper-facing endpoints.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub listing: String,
    pub events: String,
    pub more: String,
    pub cart_add: String,
    pub modal_open: String,
    pub modal_close: String,
    pub select_all: String,
    pub remove_selected: String,
    pub clear: String,
    pub checkout: String,
}

impl Endpoints {
    #[must_use]
    pub fn new(base: &BasePath) -> Self {
        Self {
            listing: base.join("/"),
            events: base.join("/events"),
            more: base.join("/products/more"),
            cart_add: base.join("/cart/add"),
            modal_open: base.join("/cart/modal/open"),
            modal_close: base.join("/cart/modal/close"),
            select_all: base.join("/cart/select-all"),
            remove_selected: base.join("/cart/remove-selected"),
            clear: base.join("/cart/clear"),
            checkout: base.join("/cart/checkout"),
        }
    }

    /// Endpoint for one cart line action, e.g. `toggle`.
    #[must_use]
    pub fn cart_item(base: &BasePath, id: &ProductId, action: &str) -> String {
        base.join(&format!(
            "/cart/items/{}/{action}",
            urlencoding::encode(id.as_str())
        ))
    }
}
