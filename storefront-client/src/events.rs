//! Commerce event bus
//!
//! Named events dispatched synchronously to current subscribers, in the
//! dispatching task. Payloads are JSON values shaped per event:
//!
//! | Event | Payload |
//! |---|---|
//! | `cart-updated` | `{cart, action, ...op args}` |
//! | `cart-empty` | same detail as the triggering `cart-updated` |
//! | `order-created` | `{order}` |
//! | `auth-state-changed` | `{loggedIn, email, reason?}` |
//!
//! The `cart-empty` derivation is not wired into the bus: it is a pure
//! policy function ([`cart_follow_up`]) the facade consults after each
//! cart-mutation dispatch, so the rule is testable without the transport.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde_json::Value;

/// Emitted after every cart mutation, with the fresh snapshot.
pub const CART_UPDATED: &str = "cart-updated";
/// Emitted immediately after a `cart-updated` whose cart has no items.
pub const CART_EMPTY: &str = "cart-empty";
/// Emitted after a successful order submission.
pub const ORDER_CREATED: &str = "order-created";
/// Emitted on login, logout, and involuntary session loss.
pub const AUTH_STATE_CHANGED: &str = "auth-state-changed";

type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    listeners: Mutex<HashMap<String, Vec<(u64, Listener)>>>,
    next_id: AtomicU64,
}

/// Synchronous pub/sub bus for commerce events.
///
/// Cheap to clone; all clones share the same listener table.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for `name`. Dropping (or explicitly
    /// unsubscribing) the returned handle removes the listener.
    pub fn subscribe(
        &self,
        name: &str,
        listener: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .listeners
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push((id, Arc::new(listener)));

        Subscription {
            bus: Arc::downgrade(&self.inner),
            name: name.to_string(),
            id,
        }
    }

    /// Notifies all current subscribers of `name`, synchronously, in
    /// registration order. Listeners registered during dispatch see only
    /// later events.
    pub fn dispatch(&self, name: &str, detail: &Value) {
        let snapshot: Vec<Listener> = {
            let listeners = self.inner.listeners.lock().unwrap();
            listeners
                .get(name)
                .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };
        tracing::debug!(event = name, listeners = snapshot.len(), "dispatching");
        for listener in snapshot {
            listener(detail);
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
pub struct Subscription {
    bus: Weak<BusInner>,
    name: String,
    id: u64,
}

impl Subscription {
    /// Removes the listener. Dropping the handle does the same.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade()
            && let Some(entries) = inner.listeners.lock().unwrap().get_mut(&self.name)
        {
            entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Post-mutation policy: a `cart-updated` detail whose cart holds no items
/// warrants exactly one follow-up `cart-empty` with the same detail.
pub fn cart_follow_up(detail: &Value) -> bool {
    detail
        .get("cart")
        .and_then(|cart| cart.get("itemCount"))
        .and_then(Value::as_u64)
        == Some(0)
}
