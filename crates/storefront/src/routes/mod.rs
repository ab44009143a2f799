//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! Everything below is mounted under the configured base path.
//!
//! ```text
//! # Pages (full document on load/restore, #root fragment on in-app navigation)
//! GET  /                          - Product listing (limit, sort, search, category1, category2)
//! GET  /product/{id}              - Product detail
//! GET  /products/more             - Infinite-scroll page (out-of-band fragments)
//!
//! # Live UI
//! GET  /events                    - SSE stream: cart badge, cart modal, toasts
//!
//! # Cart (HTMX, no swap; UI follows over SSE)
//! POST /cart/add                  - Add to cart
//! POST /cart/modal/open           - Open the cart modal
//! POST /cart/modal/close          - Close the cart modal
//! POST /cart/items/{id}/toggle    - Toggle selection
//! POST /cart/items/{id}/quantity  - Set quantity
//! POST /cart/items/{id}/increase  - Quantity + 1
//! POST /cart/items/{id}/decrease  - Quantity - 1
//! POST /cart/items/{id}/remove    - Remove line
//! POST /cart/select-all           - Select or deselect all
//! POST /cart/remove-selected      - Remove selected lines
//! POST /cart/clear                - Empty the cart
//! POST /cart/checkout             - Checkout placeholder
//!
//! # Toasts
//! POST /toasts/{id}/dismiss       - Dismiss a toast
//! ```
//!
//! Unknown paths fall back to [`pages::fallback`], which redirects to the
//! canonical URL of the page they normalise to, or to the listing.

pub mod cart;
pub mod events;
pub mod pages;
pub mod toasts;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/modal/open", post(cart::open_modal))
        .route("/modal/close", post(cart::close_modal))
        .route("/items/{id}/toggle", post(cart::toggle))
        .route("/items/{id}/quantity", post(cart::set_quantity))
        .route("/items/{id}/increase", post(cart::increase))
        .route("/items/{id}/decrease", post(cart::decrease))
        .route("/items/{id}/remove", post(cart::remove))
        .route("/select-all", post(cart::select_all))
        .route("/remove-selected", post(cart::remove_selected))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create all shopper-facing routes (relative to the base path).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::listing))
        .route("/product/{id}", get(pages::detail))
        .route("/products/more", get(pages::more))
        .route("/events", get(events::stream))
        .nest("/cart", cart_routes())
        .route("/toasts/{id}/dismiss", post(toasts::dismiss))
}
