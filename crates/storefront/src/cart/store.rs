//! The shopper's cart store.
//!
//! Every state change follows the same sequence: mutate the in-memory items,
//! persist them, then notify subscribers in subscription order with a fresh
//! snapshot. Mutators that change nothing skip persistence and notification
//! and return `false`.
//!
//! Notifications run synchronously on the caller's thread while a per-store
//! serialisation lock is held, so two concurrent mutations can never deliver
//! their snapshots out of order. Listeners therefore must not call back into
//! the store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use pocket_mall_core::ProductId;
use tracing::{debug, error, warn};

use super::item::{CartItem, CartSnapshot, decode_items};
use super::storage::{CART_STORAGE_KEY, CartStorage};
use crate::catalog::Product;

/// Source of product data for `add_item`: whatever the shopper is currently
/// looking at.
pub trait ProductLookup: Send + Sync {
    fn find_product(&self, id: &ProductId) -> Option<Product>;
}

/// Callback invoked with every snapshot.
pub type Listener = Arc<dyn Fn(&CartSnapshot) + Send + Sync>;

/// Cart state for one shopper. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    items: Mutex<Vec<CartItem>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
    serial: Mutex<()>,
    storage: Arc<dyn CartStorage>,
    products: Arc<dyn ProductLookup>,
}

impl CartStore {
    /// Create a store, restoring any cart found in `storage`.
    ///
    /// Missing, unreadable or malformed content yields an empty cart.
    #[must_use]
    pub fn load(storage: Arc<dyn CartStorage>, products: Arc<dyn ProductLookup>) -> Self {
        let items = match storage.read(CART_STORAGE_KEY) {
            Ok(Some(raw)) => decode_items(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding malformed stored cart");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart");
                Vec::new()
            }
        };
        debug!(items = items.len(), "Cart loaded");

        Self {
            inner: Arc::new(CartStoreInner {
                items: Mutex::new(items),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
                serial: Mutex::new(()),
                storage,
                products,
            }),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from_items(&self.inner.items.lock())
    }

    /// Quantity of `product_id` in the cart, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.inner.items.lock()
            .iter()
            .find(|item| &item.product_id == product_id)
            .map(|item| item.quantity)
    }

    /// Register a listener and call it once, synchronously, with the current
    /// snapshot. The listener stays registered until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartSnapshot) + Send + Sync + 'static,
    {
        let _serial = self.inner.serial.lock();
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(listener);
        self.inner.listeners.lock().push((id, listener.clone()));

        let snapshot = self.snapshot();
        listener(&snapshot);

        Subscription {
            id,
            store: Some(Arc::downgrade(&self.inner)),
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Add one unit of a product the shopper is looking at.
    ///
    /// An existing line gains one unit and is re-selected. Unknown products
    /// are logged and ignored.
    pub fn add_item(&self, product_id: &ProductId) -> bool {
        self.add_items(product_id, 1)
    }

    /// Add `quantity` units (at least one) of a product.
    pub fn add_items(&self, product_id: &ProductId, quantity: u32) -> bool {
        let Some(product) = self.inner.products.find_product(product_id) else {
            warn!(product_id = %product_id, "Product not found for cart add");
            return false;
        };
        let quantity = quantity.max(1);

        self.commit(|items| {
            if let Some(item) = items.iter_mut().find(|item| &item.product_id == product_id) {
                item.quantity = item.quantity.saturating_add(quantity);
                item.selected = true;
            } else {
                items.push(CartItem::from_product(&product, quantity));
            }
            true
        })
    }

    /// Flip one line's selection.
    pub fn toggle_item(&self, product_id: &ProductId) -> bool {
        self.commit(|items| {
            items
                .iter_mut()
                .find(|item| &item.product_id == product_id)
                .is_some_and(|item| {
                    item.selected = !item.selected;
                    true
                })
        })
    }

    /// Select or deselect every line.
    pub fn toggle_all(&self, checked: bool) -> bool {
        self.commit(|items| {
            if items.iter().all(|item| item.selected == checked) {
                return false;
            }
            for item in items.iter_mut() {
                item.selected = checked;
            }
            true
        })
    }

    /// Set a line's quantity, clamped to at least one.
    pub fn update_quantity(&self, product_id: &ProductId, quantity: u32) -> bool {
        let quantity = quantity.max(1);
        self.commit(|items| {
            match items.iter_mut().find(|item| &item.product_id == product_id) {
                Some(item) if item.quantity != quantity => {
                    item.quantity = quantity;
                    true
                }
                _ => false,
            }
        })
    }

    /// Move a line's quantity by `delta` units, never below one.
    ///
    /// The read and the write happen inside one commit, so concurrent
    /// adjustments to the same line all take effect.
    pub fn adjust_quantity(&self, product_id: &ProductId, delta: i64) -> bool {
        self.commit(|items| {
            let Some(item) = items.iter_mut().find(|item| &item.product_id == product_id) else {
                return false;
            };
            let target = i64::from(item.quantity).saturating_add(delta).max(1);
            let quantity = u32::try_from(target).unwrap_or(u32::MAX);
            if quantity == item.quantity {
                return false;
            }
            item.quantity = quantity;
            true
        })
    }

    pub fn remove_item(&self, product_id: &ProductId) -> bool {
        self.commit(|items| {
            let before = items.len();
            items.retain(|item| &item.product_id != product_id);
            items.len() != before
        })
    }

    /// Remove every selected line.
    pub fn remove_selected(&self) -> bool {
        self.commit(|items| {
            let before = items.len();
            items.retain(|item| !item.selected);
            items.len() != before
        })
    }

    pub fn clear(&self) -> bool {
        self.commit(|items| {
            if items.is_empty() {
                return false;
            }
            items.clear();
            true
        })
    }

    /// Apply `mutate`; when it reports a change, persist and notify.
    fn commit(&self, mutate: impl FnOnce(&mut Vec<CartItem>) -> bool) -> bool {
        let _serial = self.inner.serial.lock();

        let (snapshot, encoded) = {
            let mut items = self.inner.items.lock();
            if !mutate(&mut *items) {
                return false;
            }
            (CartSnapshot::from_items(&items), serde_json::to_string(&*items))
        };

        match encoded {
            Ok(raw) => {
                if let Err(e) = self.inner.storage.write(CART_STORAGE_KEY, &raw) {
                    error!(error = %e, "Failed to persist cart");
                }
            }
            Err(e) => error!(error = %e, "Failed to serialize cart"),
        }

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
        true
    }
}

/// Handle for a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    store: Option<Weak<CartStoreInner>>,
}

impl Subscription {
    /// Detach the listener now.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(inner) = self.store.take().and_then(|weak| weak.upgrade()) {
            // Waits out an in-flight notification; none arrives after this.
            let _serial = inner.serial.lock();
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
