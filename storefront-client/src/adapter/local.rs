//! Local backend adapter
//!
//! Everything stays on the device: the cart persists synchronously to
//! durable storage under its own key, orders live in memory for the life
//! of the adapter, and there are no accounts. Orders complete instantly
//! with sequential ids.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use shared::client::{CustomerInfo, CustomerProfile, LoginChallenge, OrderDraft};
use shared::models::{Address, CartView, LineItem, Order};

use crate::cart::{CartStore, LOCAL_CART_STORAGE_KEY};
use crate::error::{ClientError, ClientResult};
use crate::order::to_wire_items;
use crate::storage::HostContext;

use super::CommerceAdapter;

pub struct LocalAdapter {
    cart: CartStore,
    orders: Mutex<Vec<Order>>,
    next_order_id: AtomicU64,
}

impl LocalAdapter {
    pub fn new(host: &HostContext) -> Self {
        Self {
            cart: CartStore::immediate(host.durable.clone(), LOCAL_CART_STORAGE_KEY),
            orders: Mutex::new(Vec::new()),
            next_order_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl CommerceAdapter for LocalAdapter {
    async fn get_cart(&self) -> ClientResult<CartView> {
        Ok(self.cart.view())
    }

    async fn add_to_cart(&self, item: LineItem) -> ClientResult<CartView> {
        Ok(self.cart.add(item))
    }

    // Absent SKUs are a no-op locally: nothing to update is not an error
    // when there is no backend to disagree with.
    async fn update_quantity(&self, sku: &str, quantity: i64) -> ClientResult<CartView> {
        self.cart.set_quantity(sku, quantity);
        Ok(self.cart.view())
    }

    async fn remove_from_cart(&self, sku: &str) -> ClientResult<CartView> {
        self.cart.remove(sku);
        Ok(self.cart.view())
    }

    async fn clear_cart(&self) -> ClientResult<CartView> {
        Ok(self.cart.clear())
    }

    async fn create_order(&self, draft: OrderDraft) -> ClientResult<Order> {
        let view = self.cart.view();
        if view.is_empty() {
            return Err(ClientError::InvalidResponse(
                "cannot create an order from an empty cart".to_string(),
            ));
        }

        let id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let order = Order {
            id: id.to_string(),
            customer: draft.customer,
            shipping: draft.shipping,
            items: to_wire_items(&view.items),
            state: "completed".to_string(),
            created_at: Utc::now(),
        };
        self.orders.lock().unwrap().push(order.clone());
        tracing::info!(order_id = %order.id, items = order.items.len(), "local order recorded");
        Ok(order)
    }

    async fn get_order(&self, id: &str) -> ClientResult<Order> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|order| order.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("order {id}")))
    }

    async fn get_orders(&self) -> ClientResult<Vec<Order>> {
        Ok(self.orders.lock().unwrap().clone())
    }

    // No accounts locally: auth operations succeed vacuously.
    async fn login(&self, _email: &str) -> ClientResult<Option<LoginChallenge>> {
        Ok(None)
    }

    async fn verify_code(
        &self,
        _email: &str,
        _code: &str,
        _challenge: &LoginChallenge,
    ) -> ClientResult<Option<CustomerInfo>> {
        Ok(None)
    }

    async fn logout(&self) -> ClientResult<()> {
        Ok(())
    }

    fn is_logged_in(&self) -> bool {
        false
    }

    fn get_customer(&self) -> Option<CustomerInfo> {
        None
    }

    async fn get_customer_profile(&self) -> ClientResult<Option<CustomerProfile>> {
        Ok(None)
    }

    async fn get_addresses(&self) -> ClientResult<Vec<Address>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::OrderCustomer;

    fn item(sku: &str, quantity: u32) -> LineItem {
        LineItem {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            quantity,
            price: Decimal::new(1999, 2),
            currency: "USD".to_string(),
            image: format!("/media/{sku}.png"),
            url: format!("/products/{sku}"),
        }
    }

    fn draft() -> OrderDraft {
        OrderDraft {
            customer: OrderCustomer {
                name: "Jo Doe".to_string(),
                email: "jo@example.com".to_string(),
            },
            shipping: Address {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                region: None,
                postcode: "12345".to_string(),
                country: "US".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn orders_complete_instantly_with_sequential_ids() {
        let host = HostContext::in_memory();
        let adapter = LocalAdapter::new(&host);

        adapter.add_to_cart(item("A", 1)).await.unwrap();
        let first = adapter.create_order(draft()).await.unwrap();
        adapter.add_to_cart(item("B", 1)).await.unwrap();
        let second = adapter.create_order(draft()).await.unwrap();

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
        assert_eq!(first.state, "completed");

        let fetched = adapter.get_order("1").await.unwrap();
        assert_eq!(fetched.items[0].sku, "A");
        assert_eq!(adapter.get_orders().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_cart_cannot_order() {
        let host = HostContext::in_memory();
        let adapter = LocalAdapter::new(&host);
        assert!(adapter.create_order(draft()).await.is_err());
    }

    #[tokio::test]
    async fn unknown_order_id_is_not_found() {
        let host = HostContext::in_memory();
        let adapter = LocalAdapter::new(&host);
        assert!(matches!(
            adapter.get_order("42").await,
            Err(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn absent_sku_mutations_are_no_ops() {
        let host = HostContext::in_memory();
        let adapter = LocalAdapter::new(&host);
        adapter.add_to_cart(item("A", 2)).await.unwrap();

        let view = adapter.update_quantity("GHOST", 5).await.unwrap();
        assert_eq!(view.item_count, 2);
        let view = adapter.remove_from_cart("GHOST").await.unwrap();
        assert_eq!(view.item_count, 2);
    }

    #[tokio::test]
    async fn local_shipping_is_always_free() {
        let host = HostContext::in_memory();
        let adapter = LocalAdapter::new(&host);
        let view = adapter.add_to_cart(item("A", 1)).await.unwrap();
        assert_eq!(view.shipping, Decimal::ZERO);
    }

    #[tokio::test]
    async fn auth_is_vacuous() {
        let host = HostContext::in_memory();
        let adapter = LocalAdapter::new(&host);
        assert!(adapter.login("jo@example.com").await.unwrap().is_none());
        assert!(!adapter.is_logged_in());
        assert!(adapter.get_customer().is_none());
        assert!(adapter.get_addresses().await.unwrap().is_empty());
    }
}
