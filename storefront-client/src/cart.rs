//! Persisted cart store
//!
//! One set of cart semantics behind two write strategies. Semantics shared
//! by both: adding an existing SKU increments its quantity by the requested
//! delta; setting a quantity at or below zero removes the line; derived
//! totals are recomputed on every read, never cached; the persisted
//! envelope is restored on construction and discarded wholesale on parse
//! failure or version mismatch.
//!
//! Strategies:
//! - immediate: synchronous persist on every mutation (local backend);
//! - debounced: each mutation cancels and restarts a single pending write
//!   task, so only the final state after the quiet period lands; every
//!   landed write also mirrors the item count into a cookie.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::task::JoinHandle;

use shared::models::{CART_SCHEMA_VERSION, CartView, LineItem, StoredCartEnvelope};

use crate::storage::{CookieSink, StorageArea};

/// Storage key for the API-backed cart envelope.
pub const CART_STORAGE_KEY: &str = "commerce_cart";
/// Storage key for the local-only cart envelope.
pub const LOCAL_CART_STORAGE_KEY: &str = "commerce_cart_local";
/// Cookie mirrored on every landed write of the debounced strategy.
pub const CART_COUNT_COOKIE: &str = "cart_items_count";

/// Shipping derivation applied at snapshot time.
#[derive(Debug, Clone, Copy)]
pub enum ShippingRule {
    /// Shipping is always zero (local backend).
    Free,
    /// Zero at or above `free_over`, otherwise `flat` (API backend).
    Threshold { free_over: Decimal, flat: Decimal },
}

impl ShippingRule {
    fn apply(self, subtotal: Decimal) -> Decimal {
        match self {
            Self::Free => Decimal::ZERO,
            Self::Threshold { free_over, flat } => {
                if subtotal >= free_over {
                    Decimal::ZERO
                } else {
                    flat
                }
            }
        }
    }
}

enum WriteStrategy {
    Immediate,
    Debounced {
        window: Duration,
        cookies: Arc<dyn CookieSink>,
        cookie_max_age: Duration,
        pending: Mutex<Option<JoinHandle<()>>>,
    },
}

/// Line items plus persistence, owned by exactly one adapter.
pub struct CartStore {
    items: Mutex<Vec<LineItem>>,
    storage: Arc<dyn StorageArea>,
    key: &'static str,
    shipping: ShippingRule,
    strategy: WriteStrategy,
}

impl CartStore {
    /// Immediate-write store for the local backend. Shipping is always
    /// zero.
    pub fn immediate(storage: Arc<dyn StorageArea>, key: &'static str) -> Self {
        Self::with_strategy(storage, key, ShippingRule::Free, WriteStrategy::Immediate)
    }

    /// Debounced-write store with cookie mirroring for the API backend.
    pub fn debounced(
        storage: Arc<dyn StorageArea>,
        key: &'static str,
        shipping: ShippingRule,
        window: Duration,
        cookies: Arc<dyn CookieSink>,
        cookie_max_age: Duration,
    ) -> Self {
        Self::with_strategy(
            storage,
            key,
            shipping,
            WriteStrategy::Debounced {
                window,
                cookies,
                cookie_max_age,
                pending: Mutex::new(None),
            },
        )
    }

    fn with_strategy(
        storage: Arc<dyn StorageArea>,
        key: &'static str,
        shipping: ShippingRule,
        strategy: WriteStrategy,
    ) -> Self {
        let items = restore(storage.as_ref(), key);
        Self {
            items: Mutex::new(items),
            storage,
            key,
            shipping,
            strategy,
        }
    }

    /// Fresh snapshot with derived totals. Never exposes internal state.
    pub fn view(&self) -> CartView {
        let items = self.items.lock().unwrap().clone();
        let item_count = items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity));
        let subtotal = items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();
        CartView {
            items,
            item_count,
            subtotal,
            shipping: self.shipping.apply(subtotal),
        }
    }

    /// Merge-on-add: an existing SKU gains the requested quantity
    /// (saturating at the ceiling), a new SKU is inserted verbatim at the
    /// end. A zero-quantity add is a no-op; no line ever holds zero.
    pub fn add(&self, item: LineItem) -> CartView {
        if item.quantity == 0 {
            return self.view();
        }
        {
            let mut items = self.items.lock().unwrap();
            match items.iter_mut().find(|existing| existing.sku == item.sku) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => items.push(item),
            }
        }
        self.persist();
        self.view()
    }

    /// Sets the quantity for `sku`; a quantity at or below zero removes
    /// the line outright, values beyond `u32::MAX` clamp to it. Returns
    /// whether the SKU was present.
    pub fn set_quantity(&self, sku: &str, quantity: i64) -> bool {
        let found = {
            let mut items = self.items.lock().unwrap();
            match items.iter().position(|item| item.sku == sku) {
                Some(index) => {
                    if quantity <= 0 {
                        items.remove(index);
                    } else {
                        items[index].quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                    }
                    true
                }
                None => false,
            }
        };
        if found {
            self.persist();
        }
        found
    }

    /// Removes the line for `sku`. Returns whether it was present.
    pub fn remove(&self, sku: &str) -> bool {
        let found = {
            let mut items = self.items.lock().unwrap();
            let before = items.len();
            items.retain(|item| item.sku != sku);
            items.len() != before
        };
        if found {
            self.persist();
        }
        found
    }

    /// Empties the cart and flushes synchronously. "Cart is empty" must be
    /// observable immediately, so this never defers to the debounce timer.
    pub fn clear(&self) -> CartView {
        self.items.lock().unwrap().clear();
        self.flush();
        self.view()
    }

    /// Cancels any pending debounced write and persists the current state
    /// now.
    pub fn flush(&self) {
        if let WriteStrategy::Debounced { pending, .. } = &self.strategy
            && let Some(handle) = pending.lock().unwrap().take()
        {
            handle.abort();
        }
        self.write_now();
    }

    fn persist(&self) {
        match &self.strategy {
            WriteStrategy::Immediate => self.write_now(),
            WriteStrategy::Debounced {
                window,
                cookies,
                cookie_max_age,
                pending,
            } => {
                let Some(payload) = self.envelope_json() else {
                    return;
                };
                let count = self.mirrored_count();
                let storage = Arc::clone(&self.storage);
                let cookies = Arc::clone(cookies);
                let key = self.key;
                let window = *window;
                let max_age = *cookie_max_age;

                // Single pending timer: a new mutation supersedes the old
                // write wholesale, so only the final state lands.
                let mut slot = pending.lock().unwrap();
                if let Some(handle) = slot.take() {
                    handle.abort();
                }
                *slot = Some(tokio::spawn(async move {
                    tokio::time::sleep(window).await;
                    storage.set(key, &payload);
                    cookies.set(CART_COUNT_COOKIE, &count.to_string(), max_age);
                }));
            }
        }
    }

    fn write_now(&self) {
        let Some(payload) = self.envelope_json() else {
            return;
        };
        self.storage.set(self.key, &payload);
        if let WriteStrategy::Debounced {
            cookies,
            cookie_max_age,
            ..
        } = &self.strategy
        {
            let count = self.mirrored_count();
            cookies.set(CART_COUNT_COOKIE, &count.to_string(), *cookie_max_age);
        }
    }

    fn mirrored_count(&self) -> u32 {
        self.items
            .lock()
            .unwrap()
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    fn envelope_json(&self) -> Option<String> {
        let envelope = StoredCartEnvelope::new(self.items.lock().unwrap().clone());
        match serde_json::to_string(&envelope) {
            Ok(payload) => Some(payload),
            Err(error) => {
                tracing::warn!(%error, "failed to serialize cart envelope");
                None
            }
        }
    }
}

impl Drop for CartStore {
    fn drop(&mut self) {
        if let WriteStrategy::Debounced { pending, .. } = &self.strategy
            && let Some(handle) = pending.lock().unwrap().take()
        {
            handle.abort();
        }
    }
}

/// Restores the persisted envelope, discarding it (and removing the stored
/// value) on parse failure or version mismatch. Never surfaces an error.
fn restore(storage: &dyn StorageArea, key: &str) -> Vec<LineItem> {
    let Some(raw) = storage.get(key) else {
        return Vec::new();
    };
    match serde_json::from_str::<StoredCartEnvelope>(&raw) {
        Ok(envelope) if envelope.version == CART_SCHEMA_VERSION => envelope.items,
        Ok(envelope) => {
            tracing::debug!(
                found = envelope.version,
                expected = CART_SCHEMA_VERSION,
                "discarding cart envelope with mismatched version"
            );
            storage.remove(key);
            Vec::new()
        }
        Err(error) => {
            tracing::debug!(%error, "discarding unparsable cart envelope");
            storage.remove(key);
            Vec::new()
        }
    }
}
