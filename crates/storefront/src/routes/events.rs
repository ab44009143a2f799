//! Server-sent UI events.
//!
//! One stream per open tab. It forwards the shopper's [`UiEvent`]s and
//! re-renders the toast container whenever the toast board changes. While a
//! stream is connected it keeps the shopper's context from idling out.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{instrument, warn};

use crate::events::UiEvent;
use crate::middleware::CurrentShopper;
use crate::render;
use crate::state::AppState;

/// How often a connected stream refreshes its shopper's idle timer.
const TOUCH_INTERVAL: Duration = Duration::from_secs(60);

/// GET /events
#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn stream(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let id = shopper.id();
    let registry = state.shoppers().clone();
    let base = shopper.render_loop().base().clone();
    let mut events = shopper.events().subscribe();
    let mut toasts = shopper.toaster().subscribe();
    // The stream holds receivers only; the context itself stays in the registry.
    drop(shopper);
    tracing::debug!("UI event stream connected");

    let sse_stream = async_stream::stream! {
        let mut touch = tokio::time::interval(TOUCH_INTERVAL);
        loop {
            let frames = tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => event.to_sse(),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "UI event stream lagged");
                        Vec::new()
                    }
                    Err(RecvError::Closed) => break,
                },
                changed = toasts.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let board = toasts.borrow_and_update().clone();
                    match render::toasts(&board, &base) {
                        Ok(markup) => UiEvent::Toasts(markup).to_sse(),
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to render toasts");
                            Vec::new()
                        }
                    }
                },
                _ = touch.tick() => {
                    if !registry.touch(id).await {
                        break;
                    }
                    Vec::new()
                },
            };
            for frame in frames {
                yield Ok(frame);
            }
        }
        tracing::debug!(shopper_id = %id, "UI event stream closed");
    };

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}
