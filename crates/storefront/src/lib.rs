//! Pocket Mall Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Architecture
//!
//! - Axum web framework with HTMX for interactivity
//! - Askama templates for server-side rendering
//! - Catalog API for products and categories
//! - One in-memory shopper context per browser session: cart store, cart
//!   modal, toasts, current page and render loop
//! - Server-sent events push cart and toast updates to open tabs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod filters;
pub mod listing;
pub mod middleware;
pub mod modal;
pub mod page;
pub mod render;
pub mod router;
pub mod routes;
pub mod shopper;
pub mod state;
pub mod toast;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the storefront router: pages and endpoints under the base path,
/// `/health` at the root, and a redirecting fallback.
pub fn app(state: AppState) -> Router {
    let base = state.config().base_path.clone();
    let secure = state.config().secure_cookies;

    let pages = if base.is_root() {
        routes::routes()
    } else {
        Router::new().nest(base.as_str(), routes::routes())
    };

    Router::new()
        .route("/health", get(health))
        .merge(pages)
        .fallback(routes::pages::fallback)
        .layer(middleware::create_session_layer(secure))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = tracing::field::Empty,
                shopper_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
