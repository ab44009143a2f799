//! UI events pushed to the browser.
//!
//! Subscriber-driven UI (cart badge, cart modal) publishes rendered markup on
//! a per-shopper broadcast channel. The `/events` SSE stream forwards each
//! event under a name that an `sse-swap` slot in the layout listens for.

use axum::response::sse::Event;
use tokio::sync::broadcast;

/// Events buffered per SSE connection before it starts lagging.
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Cart badge markup.
    CartBadge(String),
    /// Modal overlay mounted; lock body scrolling.
    ModalMounted,
    /// Full modal markup for the latest snapshot.
    ModalContent(String),
    /// Move focus into the modal.
    ModalFocus,
    /// Modal removed; restore body scrolling.
    ModalClosed,
    /// Toast container markup.
    Toasts(String),
}

impl UiEvent {
    /// SSE event name; matches an `sse-swap` slot.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CartBadge(_) => "cart-badge",
            Self::ModalMounted | Self::ModalClosed => "scroll-lock",
            Self::ModalContent(_) => "cart-modal",
            Self::ModalFocus => "cart-modal-focus",
            Self::Toasts(_) => "toasts",
        }
    }

    fn data(&self) -> &str {
        match self {
            Self::CartBadge(markup) | Self::ModalContent(markup) | Self::Toasts(markup) => markup,
            Self::ModalMounted => "locked",
            Self::ModalClosed => "unlocked",
            Self::ModalFocus => "focus",
        }
    }

    /// SSE frames for this event. Closing the modal also clears its slot.
    #[must_use]
    pub fn to_sse(&self) -> Vec<Event> {
        let event = Event::default().event(self.name()).data(self.data());
        match self {
            Self::ModalClosed => vec![event, Event::default().event("cart-modal").data("")],
            _ => vec![event],
        }
    }
}

/// Per-shopper event channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Publish to every connected stream. Events with no listener are dropped.
    pub fn publish(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No UI event listeners");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }
}
