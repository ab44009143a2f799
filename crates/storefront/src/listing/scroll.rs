//! Infinite scroll controller for the listing page.
//!
//! The browser reports scroll metrics; the controller decides whether they
//! warrant fetching the next page. It is bound only while the listing has
//! more pages, admits one page fetch at a time, and invalidates outstanding
//! fetches whenever it is unbound so late results cannot leak into a newer
//! listing.

use parking_lot::Mutex;
use serde::Deserialize;

/// Distance from the bottom of the document, in CSS pixels, that triggers
/// the next page fetch.
pub const DEFAULT_THRESHOLD_PX: f64 = 300.0;

/// Scroll position reported by the browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    /// Pixels left between the bottom of the viewport and the document end.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        self.document_height - (self.scroll_top + self.viewport_height)
    }
}

/// Permission to fetch one page; must be handed back via
/// [`ScrollController::finish`] or [`ScrollController::abort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
    generation: u64,
}

#[derive(Debug, Default)]
struct ScrollState {
    bound: bool,
    in_flight: bool,
    generation: u64,
}

/// Per-shopper infinite scroll state.
#[derive(Debug)]
pub struct ScrollController {
    threshold_px: f64,
    state: Mutex<ScrollState>,
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_PX)
    }
}

impl ScrollController {
    #[must_use]
    pub fn new(threshold_px: f64) -> Self {
        Self {
            threshold_px,
            state: Mutex::new(ScrollState::default()),
        }
    }

    /// Start listening if the listing has more pages.
    ///
    /// Returns `true` only when this call changed the controller from unbound
    /// to bound; binding twice is a no-op.
    pub fn bind(&self, has_next: bool) -> bool {
        let mut state = self.state.lock();
        if state.bound || !has_next {
            return false;
        }
        state.bound = true;
        state.in_flight = false;
        tracing::debug!(generation = state.generation, "Infinite scroll bound");
        true
    }

    /// Stop listening and invalidate any fetch in flight.
    pub fn unbind(&self) {
        let mut state = self.state.lock();
        if state.bound || state.in_flight {
            tracing::debug!(generation = state.generation, "Infinite scroll unbound");
        }
        state.bound = false;
        state.in_flight = false;
        state.generation = state.generation.wrapping_add(1);
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.state.lock().bound
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.state.lock().in_flight
    }

    /// Handle a scroll report. Returns a ticket when the next page should be
    /// fetched now.
    pub fn on_scroll(&self, metrics: &ScrollMetrics) -> Option<FetchTicket> {
        let mut state = self.state.lock();
        if !state.bound || state.in_flight || metrics.remaining() > self.threshold_px {
            return None;
        }
        state.in_flight = true;
        Some(FetchTicket {
            generation: state.generation,
        })
    }

    /// Complete a successful fetch.
    ///
    /// Returns `false` when the ticket belongs to a superseded listing; the
    /// caller must then discard the fetched page. Unbinds when no further
    /// pages remain.
    pub fn finish(&self, ticket: FetchTicket, has_next: bool) -> bool {
        let mut state = self.state.lock();
        if ticket.generation != state.generation {
            return false;
        }
        state.in_flight = false;
        if !has_next {
            state.bound = false;
            state.generation = state.generation.wrapping_add(1);
        }
        true
    }

    /// Release a ticket after a failed fetch so a later scroll can retry.
    pub fn abort(&self, ticket: FetchTicket) {
        let mut state = self.state.lock();
        if ticket.generation == state.generation {
            state.in_flight = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near_bottom() -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: 1500.0,
            viewport_height: 800.0,
            document_height: 2500.0,
        }
    }

    fn far_from_bottom() -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: 0.0,
            viewport_height: 800.0,
            document_height: 2500.0,
        }
    }

    #[test]
    fn test_unbound_controller_ignores_scroll() {
        let scroll = ScrollController::default();
        assert!(scroll.on_scroll(&near_bottom()).is_none());
    }

    #[test]
    fn test_bind_requires_next_page() {
        let scroll = ScrollController::default();
        assert!(!scroll.bind(false));
        assert!(!scroll.is_bound());
        assert!(scroll.bind(true));
        assert!(!scroll.bind(true), "binding twice must be a no-op");
    }

    #[test]
    fn test_threshold() {
        let scroll = ScrollController::default();
        scroll.bind(true);
        assert!(scroll.on_scroll(&far_from_bottom()).is_none());

        let exactly_at_threshold = ScrollMetrics {
            scroll_top: 1400.0,
            ..near_bottom()
        };
        assert!(scroll.on_scroll(&exactly_at_threshold).is_some());
    }

    #[test]
    fn test_single_fetch_in_flight() {
        let scroll = ScrollController::default();
        scroll.bind(true);
        let ticket = scroll.on_scroll(&near_bottom()).expect("first scroll fetches");
        assert!(scroll.on_scroll(&near_bottom()).is_none());
        assert!(scroll.finish(ticket, true));
        assert!(scroll.on_scroll(&near_bottom()).is_some());
    }

    #[test]
    fn test_last_page_unbinds() {
        let scroll = ScrollController::default();
        scroll.bind(true);
        let ticket = scroll.on_scroll(&near_bottom()).expect("fetch");
        assert!(scroll.finish(ticket, false));
        assert!(!scroll.is_bound());
        assert!(scroll.on_scroll(&near_bottom()).is_none());
    }

    #[test]
    fn test_unbind_discards_stale_ticket() {
        let scroll = ScrollController::default();
        scroll.bind(true);
        let stale = scroll.on_scroll(&near_bottom()).expect("fetch");

        // A new filter-driven render starts and binds a fresh listing.
        scroll.unbind();
        scroll.bind(true);

        assert!(!scroll.finish(stale, true));
        let fresh = scroll.on_scroll(&near_bottom()).expect("fresh listing can fetch");
        assert!(scroll.finish(fresh, true));
    }

    #[test]
    fn test_abort_allows_retry() {
        let scroll = ScrollController::default();
        scroll.bind(true);
        let ticket = scroll.on_scroll(&near_bottom()).expect("fetch");
        scroll.abort(ticket);
        assert!(!scroll.is_fetching());
        assert!(scroll.on_scroll(&near_bottom()).is_some());
    }
}
