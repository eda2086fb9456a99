//! API backend adapter
//!
//! Cart state stays client-side with debounced persistence and a mirrored
//! count cookie; orders and accounts go over the wire. Authenticated
//! traffic is routed through the session manager so a rejected token tears
//! the session down in one place.

use std::sync::Arc;

use async_trait::async_trait;

use shared::client::{
    AddressListEnvelope, CreateOrderRequest, CustomerInfo, CustomerProfile, LoginChallenge,
    OrderDraft, OrderEnvelope, OrderListEnvelope,
};
use shared::models::{Address, CartView, LineItem, Order};

use crate::cart::{CART_STORAGE_KEY, CartStore, ShippingRule};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::events::EventBus;
use crate::http::HttpClient;
use crate::order::to_wire_items;
use crate::session::SessionManager;
use crate::storage::HostContext;

use super::CommerceAdapter;

pub struct ApiAdapter {
    cart: CartStore,
    session: SessionManager,
}

impl ApiAdapter {
    pub fn new(config: &ClientConfig, host: &HostContext, events: EventBus) -> ClientResult<Self> {
        let http = HttpClient::new(config)?;
        let cart = CartStore::debounced(
            host.durable.clone(),
            CART_STORAGE_KEY,
            ShippingRule::Threshold {
                free_over: config.free_shipping_threshold,
                flat: config.flat_shipping_fee,
            },
            config.cart_write_debounce,
            Arc::clone(&host.cookies),
            config.cart_cookie_max_age,
        );
        Ok(Self {
            cart,
            session: SessionManager::new(http, host.clone(), events),
        })
    }

    fn customer_email(&self) -> ClientResult<String> {
        self.session
            .customer()
            .map(|customer| customer.email)
            .ok_or(ClientError::Unauthorized)
    }
}

#[async_trait]
impl CommerceAdapter for ApiAdapter {
    async fn get_cart(&self) -> ClientResult<CartView> {
        Ok(self.cart.view())
    }

    async fn add_to_cart(&self, item: LineItem) -> ClientResult<CartView> {
        Ok(self.cart.add(item))
    }

    async fn update_quantity(&self, sku: &str, quantity: i64) -> ClientResult<CartView> {
        if !self.cart.set_quantity(sku, quantity) {
            return Err(ClientError::ItemNotFound {
                sku: sku.to_string(),
            });
        }
        Ok(self.cart.view())
    }

    async fn remove_from_cart(&self, sku: &str) -> ClientResult<CartView> {
        if !self.cart.remove(sku) {
            return Err(ClientError::ItemNotFound {
                sku: sku.to_string(),
            });
        }
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
        // Flush so the persisted envelope matches what the backend is told
        self.cart.flush();

        let request = CreateOrderRequest {
            customer: draft.customer,
            shipping: draft.shipping,
            items: to_wire_items(&view.items),
        };
        let envelope: OrderEnvelope = self
            .session
            .post_with_optional_auth("/orders", &request)
            .await?;
        tracing::info!(order_id = %envelope.order.id, "order submitted");
        Ok(envelope.order)
    }

    async fn get_order(&self, id: &str) -> ClientResult<Order> {
        let envelope: OrderEnvelope = self
            .session
            .get_with_optional_auth(&format!("/orders/{id}"))
            .await?;
        Ok(envelope.order)
    }

    async fn get_orders(&self) -> ClientResult<Vec<Order>> {
        let email = self.customer_email()?;
        let envelope: OrderListEnvelope = self
            .session
            .authed_get(&format!("/customers/{email}/orders"))
            .await?;
        Ok(envelope.orders)
    }

    async fn login(&self, email: &str) -> ClientResult<Option<LoginChallenge>> {
        self.session.login(email).await.map(Some)
    }

    async fn verify_code(
        &self,
        email: &str,
        code: &str,
        challenge: &LoginChallenge,
    ) -> ClientResult<Option<CustomerInfo>> {
        self.session.verify_code(email, code, challenge).await.map(Some)
    }

    async fn logout(&self) -> ClientResult<()> {
        self.session.logout().await
    }

    fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    fn get_customer(&self) -> Option<CustomerInfo> {
        self.session.customer()
    }

    async fn get_customer_profile(&self) -> ClientResult<Option<CustomerProfile>> {
        let email = self.customer_email()?;
        let profile: CustomerProfile = self
            .session
            .authed_get(&format!("/customers/{email}"))
            .await?;
        Ok(Some(profile))
    }

    async fn get_addresses(&self) -> ClientResult<Vec<Address>> {
        let email = self.customer_email()?;
        let envelope: AddressListEnvelope = self
            .session
            .authed_get(&format!("/customers/{email}/addresses"))
            .await?;
        Ok(envelope.addresses)
    }
}
