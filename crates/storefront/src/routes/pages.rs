//! Page route handlers: listing, detail and infinite scroll.
//!
//! Every page request runs one render pass on the shopper's render loop.
//! In-app navigations (HTMX requests) get the `#root` fragment and an
//! `HX-Push-Url` header; initial loads, reloads and history restores get the
//! full document with the cart badge, an open modal and live toasts already
//! in place.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::instrument;

use pocket_mall_core::ProductId;

use crate::error::Result;
use crate::listing::{Filters, ListingQuery, ScrollMetrics};
use crate::middleware::CurrentShopper;
use crate::page::PageView;
use crate::render::{self, Document};
use crate::router::{Navigation, PageFrame, RenderOutcome, Route, ScrollOutcome, normalize_path};
use crate::shopper::Shopper;
use crate::state::AppState;

const SITE_NAME: &str = "Pocket Mall";

/// Product listing.
#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn listing(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    headers: HeaderMap,
    Query(query): Query<ListingQuery>,
) -> Result<Response> {
    let filters = Filters::from_query(&query);
    show(&state, &shopper, &headers, &Route::Listing, &filters).await
}

/// Product detail. Unusable IDs go back to the listing.
#[instrument(skip_all, fields(shopper_id = %shopper.id(), product_id = %raw_id))]
pub async fn detail(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Response> {
    let base = shopper.render_loop().base();
    let Ok(id) = ProductId::parse(&raw_id) else {
        return Ok(Redirect::to(&base.join("/")).into_response());
    };
    show(&state, &shopper, &headers, &Route::Detail(id), &Filters::default()).await
}

/// Scroll report from the listing. Responds with out-of-band fragments when
/// a page was appended, and with nothing otherwise.
#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn more(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Query(metrics): Query<ScrollMetrics>,
) -> Result<Response> {
    match shopper.render_loop().load_more(state.catalog(), &metrics).await? {
        ScrollOutcome::Appended { markup, has_next } => {
            tracing::debug!(has_next, "Appended listing page");
            Ok(Html(markup).into_response())
        }
        ScrollOutcome::Idle | ScrollOutcome::Stale | ScrollOutcome::Failed => {
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// Any path without a handler. Paths that normalise to a page redirect to
/// its canonical URL; everything else redirects to the listing.
#[instrument(skip_all, fields(path = %uri.path()))]
pub async fn fallback(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> Redirect {
    let base = &state.config().base_path;
    let route = Route::resolve(&normalize_path(uri.path(), base));
    let filters = match route {
        Route::Listing => Query::<ListingQuery>::try_from_uri(&uri)
            .map(|Query(query)| Filters::from_query(&query))
            .unwrap_or_default(),
        _ => Filters::default(),
    };
    Redirect::to(&route.href(base, &filters))
}

/// Run a render pass and answer according to how the page was reached.
async fn show(
    state: &AppState,
    shopper: &Shopper,
    headers: &HeaderMap,
    route: &Route,
    filters: &Filters,
) -> Result<Response> {
    let mut frame = PageFrame::new();
    let outcome = shopper
        .render_loop()
        .render(route, filters, state.catalog(), &mut frame)
        .await?;

    if let RenderOutcome::Superseded = outcome {
        // A newer navigation owns the screen.
        return Ok((StatusCode::NO_CONTENT, [("HX-Reswap", "none")]).into_response());
    }

    let base = shopper.render_loop().base();
    let body = frame.into_current().unwrap_or_default();

    match Navigation::from_headers(headers) {
        Navigation::Push => {
            let url = route.href(base, filters);
            Ok(([("HX-Push-Url", url)], Html(body)).into_response())
        }
        Navigation::Pop => {
            let mut document = Document::new(page_title(&shopper.page().get()), base, body);
            document.cart_badge = render::cart_badge(&shopper.cart().snapshot())?;
            document.cart_modal = shopper.modal().markup()?;
            document.toasts = render::toasts(&shopper.toaster().board(), base)?;
            Ok(document.into_response())
        }
    }
}

fn page_title(view: &PageView) -> String {
    match view {
        PageView::Detail(detail) if !detail.product.title.is_empty() => {
            format!("{} | {SITE_NAME}", detail.product.title)
        }
        _ => SITE_NAME.to_string(),
    }
}
