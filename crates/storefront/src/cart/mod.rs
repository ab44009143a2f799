//! Shopping cart: line items, durable storage and the per-shopper store.

pub mod item;
pub mod storage;
pub mod store;

pub use item::{CartItem, CartLine, CartSnapshot, CartSummary};
pub use storage::{
    CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage, ScopedStorage, StorageError,
};
pub use store::{CartStore, Listener, ProductLookup, Subscription};
