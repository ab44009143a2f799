//! Per-shopper application context.
//!
//! Each browser session owns one [`Shopper`]: its cart, cart modal, toasts,
//! current page and render loop. Shoppers live in a [`ShopperRegistry`]
//! keyed by the [`ShopperId`] stored in the session, and are evicted after a
//! period without requests.

use std::path::PathBuf;
use std::sync::Arc;

use moka::future::Cache;
use tracing::{error, info};

use pocket_mall_core::ShopperId;

use crate::cart::{CartStorage, CartStore, FileStorage, MemoryStorage, ScopedStorage, Subscription};
use crate::config::StorefrontConfig;
use crate::events::{EventBus, UiEvent};
use crate::listing::ScrollController;
use crate::modal::CartModal;
use crate::page::PageState;
use crate::render;
use crate::router::{BasePath, RenderLoop};
use crate::toast::Toaster;

/// Everything one shopper has on screen.
pub struct Shopper {
    id: ShopperId,
    cart: CartStore,
    modal: CartModal,
    toaster: Toaster,
    page: Arc<PageState>,
    render_loop: RenderLoop,
    events: EventBus,
    _badge: Subscription,
}

impl Shopper {
    /// Build a shopper and load their cart from `storage`.
    #[must_use]
    pub fn new(
        id: ShopperId,
        storage: Arc<dyn CartStorage>,
        base: &BasePath,
        default_total_pages: u32,
    ) -> Self {
        let page = Arc::new(PageState::new());
        let cart = CartStore::load(storage, page.clone());
        let events = EventBus::new();
        let toaster = Toaster::new();

        let badge_events = events.clone();
        let badge = cart.subscribe(move |snapshot| match render::cart_badge(snapshot) {
            Ok(markup) => badge_events.publish(UiEvent::CartBadge(markup)),
            Err(e) => error!(error = %e, "Failed to render cart badge"),
        });

        let render_loop = RenderLoop::new(
            base.clone(),
            default_total_pages,
            page.clone(),
            Arc::new(ScrollController::default()),
            toaster.clone(),
        );
        let modal = CartModal::new(cart.clone(), events.clone(), base.clone());

        Self {
            id,
            cart,
            modal,
            toaster,
            page,
            render_loop,
            events,
            _badge: badge,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ShopperId {
        self.id
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    #[must_use]
    pub const fn modal(&self) -> &CartModal {
        &self.modal
    }

    #[must_use]
    pub const fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    #[must_use]
    pub fn page(&self) -> &PageState {
        &self.page
    }

    #[must_use]
    pub const fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }
}

/// Where shopper carts are persisted.
#[derive(Clone)]
enum CartBackend {
    /// One directory per shopper under the configured cart directory.
    Files(PathBuf),
    /// One process-wide map, scoped by shopper.
    Memory(Arc<MemoryStorage>),
}

impl CartBackend {
    fn storage_for(&self, id: ShopperId) -> Arc<dyn CartStorage> {
        match self {
            Self::Files(dir) => Arc::new(FileStorage::new(dir.join(id.to_string()))),
            Self::Memory(shared) => Arc::new(ScopedStorage::new(id.to_string(), shared.clone())),
        }
    }
}

/// Live shoppers, keyed by session.
///
/// Cheap to clone. Entries expire after the configured idle time; carts
/// survive eviction because they are reloaded from storage.
#[derive(Clone)]
pub struct ShopperRegistry {
    shoppers: Cache<ShopperId, Arc<Shopper>>,
    backend: CartBackend,
    base: BasePath,
    default_total_pages: u32,
}

impl ShopperRegistry {
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let backend = match &config.cart_dir {
            Some(dir) => {
                info!(cart_dir = %dir.display(), "Persisting carts to disk");
                CartBackend::Files(dir.clone())
            }
            None => {
                info!("Persisting carts in memory");
                CartBackend::Memory(Arc::new(MemoryStorage::new()))
            }
        };

        Self {
            shoppers: Cache::builder()
                .time_to_idle(config.shopper_idle)
                .build(),
            backend,
            base: config.base_path.clone(),
            default_total_pages: config.catalog.default_total_pages,
        }
    }

    /// The shopper for `id`, created (and their cart loaded) on first use.
    pub async fn get_or_create(&self, id: ShopperId) -> Arc<Shopper> {
        self.shoppers
            .get_with(id, async {
                tracing::debug!(shopper_id = %id, "Creating shopper context");
                Arc::new(Shopper::new(
                    id,
                    self.backend.storage_for(id),
                    &self.base,
                    self.default_total_pages,
                ))
            })
            .await
    }

    /// Reset the idle timer of a live shopper. Returns `false` if evicted.
    pub async fn touch(&self, id: ShopperId) -> bool {
        self.shoppers.get(&id).await.is_some()
    }

    /// Number of live shoppers.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.shoppers.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
