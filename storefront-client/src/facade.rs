//! Commerce facade
//!
//! The single entry point a host application talks to. The backend adapter
//! is resolved lazily on first use and memoized for the life of the
//! instance; concurrent first calls share one resolution. Every cart
//! mutation that goes through here emits `cart-updated` (and `cart-empty`
//! when warranted) on the shared event bus.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::OnceCell;

use shared::client::{CustomerInfo, CustomerProfile, LoginChallenge, OrderDraft};
use shared::models::{Address, CartView, LineItem, Order};

use crate::adapter::{ApiAdapter, CommerceAdapter, LocalAdapter};
use crate::config::{BackendKind, ClientConfig};
use crate::error::ClientResult;
use crate::events::{CART_EMPTY, CART_UPDATED, EventBus, ORDER_CREATED, cart_follow_up};
use crate::storage::HostContext;

/// Durable-store key holding the backend override. When present and
/// parsable it wins over the configured default.
pub const BACKEND_OVERRIDE_KEY: &str = "commerce_backend";

/// Facade over the resolved backend adapter.
pub struct Commerce {
    config: ClientConfig,
    host: HostContext,
    events: EventBus,
    adapter: OnceCell<Arc<dyn CommerceAdapter>>,
}

impl Commerce {
    pub fn new(config: ClientConfig, host: HostContext) -> Self {
        Self {
            config,
            host,
            events: EventBus::new(),
            adapter: OnceCell::new(),
        }
    }

    /// The shared event bus. Clones observe the same listener table, so a
    /// host can subscribe before or after the first commerce call.
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    /// Persists a backend override for future instances. Takes effect on
    /// the next construction, never retroactively.
    pub fn set_backend_override(&self, backend: BackendKind) {
        self.host.durable.set(BACKEND_OVERRIDE_KEY, backend.as_str());
    }

    /// Resolves the adapter once. The persisted override is consulted
    /// first; an absent or unparsable override falls back to the
    /// configured default.
    pub(crate) async fn ensure_adapter(&self) -> ClientResult<&Arc<dyn CommerceAdapter>> {
        self.adapter
            .get_or_try_init(|| async {
                let kind = self
                    .host
                    .durable
                    .get(BACKEND_OVERRIDE_KEY)
                    .and_then(|value| BackendKind::parse(&value))
                    .unwrap_or(self.config.backend);
                tracing::info!(backend = kind.as_str(), "resolving commerce backend");

                let adapter: Arc<dyn CommerceAdapter> = match kind {
                    BackendKind::Local => Arc::new(LocalAdapter::new(&self.host)),
                    BackendKind::Api => Arc::new(ApiAdapter::new(
                        &self.config,
                        &self.host,
                        self.events.clone(),
                    )?),
                };
                Ok(adapter)
            })
            .await
    }

    fn emit_cart(&self, cart: &CartView, action: &str, extra: Value) {
        let mut detail = json!({"cart": cart, "action": action});
        if let (Some(detail_map), Some(extra_map)) = (detail.as_object_mut(), extra.as_object()) {
            for (key, value) in extra_map {
                detail_map.insert(key.clone(), value.clone());
            }
        }
        self.events.dispatch(CART_UPDATED, &detail);
        if cart_follow_up(&detail) {
            self.events.dispatch(CART_EMPTY, &detail);
        }
    }

    // Cart

    pub async fn get_cart(&self) -> ClientResult<CartView> {
        self.ensure_adapter().await?.get_cart().await
    }

    pub async fn add_to_cart(&self, item: LineItem) -> ClientResult<CartView> {
        let sku = item.sku.clone();
        let cart = self.ensure_adapter().await?.add_to_cart(item).await?;
        self.emit_cart(&cart, "add", json!({"sku": sku}));
        Ok(cart)
    }

    pub async fn update_quantity(&self, sku: &str, quantity: i64) -> ClientResult<CartView> {
        let cart = self
            .ensure_adapter()
            .await?
            .update_quantity(sku, quantity)
            .await?;
        self.emit_cart(&cart, "update", json!({"sku": sku, "quantity": quantity}));
        Ok(cart)
    }

    pub async fn remove_from_cart(&self, sku: &str) -> ClientResult<CartView> {
        let cart = self.ensure_adapter().await?.remove_from_cart(sku).await?;
        self.emit_cart(&cart, "remove", json!({"sku": sku}));
        Ok(cart)
    }

    pub async fn clear_cart(&self) -> ClientResult<CartView> {
        let cart = self.ensure_adapter().await?.clear_cart().await?;
        self.emit_cart(&cart, "clear", json!({}));
        Ok(cart)
    }

    // Orders

    pub async fn create_order(&self, draft: OrderDraft) -> ClientResult<Order> {
        let order = self.ensure_adapter().await?.create_order(draft).await?;
        self.events.dispatch(ORDER_CREATED, &json!({"order": order}));
        Ok(order)
    }

    pub async fn get_order(&self, id: &str) -> ClientResult<Order> {
        self.ensure_adapter().await?.get_order(id).await
    }

    pub async fn get_orders(&self) -> ClientResult<Vec<Order>> {
        self.ensure_adapter().await?.get_orders().await
    }

    // Auth

    pub async fn login(&self, email: &str) -> ClientResult<Option<LoginChallenge>> {
        self.ensure_adapter().await?.login(email).await
    }

    pub async fn verify_code(
        &self,
        email: &str,
        code: &str,
        challenge: &LoginChallenge,
    ) -> ClientResult<Option<CustomerInfo>> {
        self.ensure_adapter()
            .await?
            .verify_code(email, code, challenge)
            .await
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.ensure_adapter().await?.logout().await
    }

    pub async fn is_logged_in(&self) -> ClientResult<bool> {
        Ok(self.ensure_adapter().await?.is_logged_in())
    }

    pub async fn get_customer(&self) -> ClientResult<Option<CustomerInfo>> {
        Ok(self.ensure_adapter().await?.get_customer())
    }

    // Account

    pub async fn get_customer_profile(&self) -> ClientResult<Option<CustomerProfile>> {
        self.ensure_adapter().await?.get_customer_profile().await
    }

    pub async fn get_addresses(&self) -> ClientResult<Vec<Address>> {
        self.ensure_adapter().await?.get_addresses().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concurrent_first_calls_share_one_adapter() {
        let commerce = Arc::new(Commerce::new(
            ClientConfig::default(),
            HostContext::in_memory(),
        ));

        let a = {
            let commerce = Arc::clone(&commerce);
            tokio::spawn(async move {
                Arc::clone(commerce.ensure_adapter().await.unwrap())
            })
        };
        let b = {
            let commerce = Arc::clone(&commerce);
            tokio::spawn(async move {
                Arc::clone(commerce.ensure_adapter().await.unwrap())
            })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn parsable_override_wins_over_the_default() {
        let host = HostContext::in_memory();
        host.durable.set(BACKEND_OVERRIDE_KEY, "local");

        let config = ClientConfig::default().with_backend(BackendKind::Api);
        let commerce = Commerce::new(config, host);

        // A local adapter answers auth vacuously; an API adapter would
        // report the absence of a session differently.
        assert!(commerce.login("jo@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unparsable_override_falls_back_to_the_default() {
        let host = HostContext::in_memory();
        host.durable.set(BACKEND_OVERRIDE_KEY, "magento");

        let commerce = Commerce::new(ClientConfig::default(), host);
        assert!(commerce.get_cart().await.unwrap().is_empty());
    }
}
