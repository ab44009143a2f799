//! The cart modal.
//!
//! At most one overlay per shopper. While open, the modal is subscribed to the
//! cart store and re-renders its full content on every snapshot. It holds no
//! cart state of its own; row controls go straight to the store.

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::cart::{CartStore, Subscription};
use crate::events::{EventBus, UiEvent};
use crate::render;
use crate::router::BasePath;

pub struct CartModal {
    store: CartStore,
    events: EventBus,
    base: BasePath,
    subscription: Mutex<Option<Subscription>>,
}

impl CartModal {
    #[must_use]
    pub fn new(store: CartStore, events: EventBus, base: BasePath) -> Self {
        Self {
            store,
            events,
            base,
            subscription: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Open the modal, or refresh and refocus it if it is already open.
    ///
    /// Returns `true` when the overlay was newly mounted.
    pub fn open(&self) -> bool {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            publish_content(&self.events, &self.base, &self.store.snapshot());
            self.events.publish(UiEvent::ModalFocus);
            return false;
        }

        self.events.publish(UiEvent::ModalMounted);
        let events = self.events.clone();
        let base = self.base.clone();
        *subscription = Some(
            self.store
                .subscribe(move |snapshot| publish_content(&events, &base, snapshot)),
        );
        self.events.publish(UiEvent::ModalFocus);
        debug!("Cart modal opened");
        true
    }

    /// Close the modal. Returns `false` if it was not open.
    pub fn close(&self) -> bool {
        let Some(subscription) = self.subscription.lock().take() else {
            return false;
        };
        subscription.unsubscribe();
        self.events.publish(UiEvent::ModalClosed);
        debug!("Cart modal closed");
        true
    }

    /// Current modal markup, or nothing when closed. Used when serving a full
    /// document so a reload keeps the modal on screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn markup(&self) -> askama::Result<String> {
        if self.is_open() {
            render::cart_modal(&self.store.snapshot(), &self.base)
        } else {
            Ok(String::new())
        }
    }
}

fn publish_content(events: &EventBus, base: &BasePath, snapshot: &crate::cart::CartSnapshot) {
    match render::cart_modal(snapshot, base) {
        Ok(markup) => events.publish(UiEvent::ModalContent(markup)),
        Err(e) => error!(error = %e, "Failed to render cart modal"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pocket_mall_core::ProductId;
    use tokio::sync::broadcast::Receiver;

    use super::*;
    use crate::cart::{MemoryStorage, ProductLookup};
    use crate::catalog::Product;

    struct OneProduct;

    impl ProductLookup for OneProduct {
        fn find_product(&self, id: &ProductId) -> Option<Product> {
            serde_json::from_value(serde_json::json!({"productId": id.as_str(), "title": "Bag", "lprice": 220}))
                .ok()
        }
    }

    fn setup() -> (CartModal, CartStore, Receiver<UiEvent>) {
        let store = CartStore::load(Arc::new(MemoryStorage::new()), Arc::new(OneProduct));
        let events = EventBus::new();
        let rx = events.subscribe();
        (CartModal::new(store.clone(), events, BasePath::root()), store, rx)
    }

    fn drain(rx: &mut Receiver<UiEvent>) -> Vec<&'static str> {
        std::iter::from_fn(|| rx.try_recv().ok()).map(|e| e.name()).collect()
    }

    #[test]
    fn test_open_mounts_renders_and_focuses() {
        let (modal, store, mut rx) = setup();

        assert!(modal.open());
        assert!(modal.is_open());
        assert_eq!(store.subscriber_count(), 1);
        assert_eq!(drain(&mut rx), ["scroll-lock", "cart-modal", "cart-modal-focus"]);
    }

    #[test]
    fn test_reopen_does_not_subscribe_twice() {
        let (modal, store, mut rx) = setup();
        modal.open();
        drain(&mut rx);

        assert!(!modal.open());
        assert_eq!(store.subscriber_count(), 1);
        assert_eq!(drain(&mut rx), ["cart-modal", "cart-modal-focus"]);
    }

    #[test]
    fn test_store_changes_rerender_while_open() {
        let (modal, store, mut rx) = setup();
        modal.open();
        drain(&mut rx);

        store.add_item(&ProductId::from("1"));
        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], UiEvent::ModalContent(markup) if markup.contains("Bag")));
    }

    #[test]
    fn test_close_is_idempotent() {
        let (modal, store, mut rx) = setup();
        modal.open();
        drain(&mut rx);

        assert!(modal.close());
        assert!(!modal.close());
        assert_eq!(store.subscriber_count(), 0);
        assert_eq!(drain(&mut rx), ["scroll-lock"]);

        store.add_item(&ProductId::from("1"));
        assert!(drain(&mut rx).is_empty());
        assert_eq!(modal.markup().unwrap(), "");
    }
}
