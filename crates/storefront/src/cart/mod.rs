//! In-memory cart store.
//!
//! The store owns the session's line items and is the only way to mutate
//! them. Every mutating operation follows the same explicit sequence:
//! mutate the items, recompute the aggregates into a fresh [`CartState`]
//! snapshot, then notify subscribers with that snapshot. Aggregates are
//! never updated in place.
//!
//! One store is constructed per process (in `AppState`) and handed to the
//! components that need it by handle; there is no ambient global cart.
//!
//! # Quantity validation contract
//!
//! [`CartStore::update_quantity`] does NOT clamp. Range validation
//! (`1..=MAX_QUANTITY`) is the caller's responsibility; the cart route
//! rejects out-of-range requests before calling the store. `add_item` is the
//! exception: repeat adds clamp at [`MAX_QUANTITY`] because the customer has
//! no way to pick the increment.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use bramble_core::{CartItem, CartState, MAX_QUANTITY, Product, ProductId};

/// Handle to the session cart.
///
/// Cheaply cloneable; all clones share the same underlying items. Operations
/// are synchronous and infallible - there is no backing store to fail
/// against - and atomic with respect to each other.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    items: Mutex<Vec<CartItem>>,
    notify: watch::Sender<CartState>,
}

impl CartStore {
    /// Create an empty cart store.
    #[must_use]
    pub fn new() -> Self {
        let (notify, _) = watch::channel(CartState::empty());
        Self {
            inner: Arc::new(CartStoreInner {
                items: Mutex::new(Vec::new()),
                notify,
            }),
        }
    }

    /// Subscribe to cart snapshots.
    ///
    /// The receiver observes the [`CartState`] produced by every mutating
    /// operation, starting from the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.notify.subscribe()
    }

    /// Add a product to the cart.
    ///
    /// If the product is already in the cart its quantity is incremented by
    /// one, clamped at [`MAX_QUANTITY`]; otherwise a new line item with
    /// quantity 1 is appended in arrival order.
    pub fn add_item(&self, product: &Product) -> CartState {
        self.mutate(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.id == product.id) {
                item.quantity = (item.quantity + 1).min(MAX_QUANTITY);
            } else {
                items.push(CartItem::from_product(product));
            }
        })
    }

    /// Remove a line item by product ID.
    ///
    /// A no-op when the ID is not in the cart.
    pub fn remove_item(&self, id: ProductId) -> CartState {
        self.mutate(|items| {
            items.retain(|item| item.id != id);
        })
    }

    /// Set the quantity of a line item.
    ///
    /// A no-op when the ID is not in the cart. The store does not validate
    /// the range - see the module docs for the caller contract.
    pub fn update_quantity(&self, id: ProductId, quantity: u32) -> CartState {
        self.mutate(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.id == id) {
                item.quantity = quantity;
            }
        })
    }

    /// Remove every line item.
    pub fn clear(&self) -> CartState {
        self.mutate(Vec::clear)
    }

    /// Quantity of the line item with this ID, or 0 if absent. Pure read.
    #[must_use]
    pub fn item_quantity(&self, id: ProductId) -> u32 {
        self.lock_items()
            .iter()
            .find(|item| item.id == id)
            .map_or(0, |item| item.quantity)
    }

    /// Whether a line item with this ID exists. Pure read.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.lock_items().iter().any(|item| item.id == id)
    }

    /// Current cart snapshot. Pure read.
    #[must_use]
    pub fn state(&self) -> CartState {
        CartState::from_items(self.lock_items().clone())
    }

    /// Run a mutation, then recompute aggregates, then notify subscribers.
    fn mutate(&self, op: impl FnOnce(&mut Vec<CartItem>)) -> CartState {
        let snapshot = {
            let mut items = self.lock_items();
            op(&mut items);
            CartState::from_items(items.clone())
        };
        self.inner.notify.send_replace(snapshot.clone());
        snapshot
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, Vec<CartItem>> {
        // A poisoned lock only means a panic mid-mutation; the item Vec
        // itself is still structurally valid.
        self.inner
            .items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
