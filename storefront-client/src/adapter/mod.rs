//! Commerce backend adapters
//!
//! One trait, two implementations. The local adapter keeps everything on
//! the device; the API adapter speaks the order/auth wire contract. The
//! facade resolves exactly one of them per instance and never mixes them.

mod api;
mod local;

pub use api::ApiAdapter;
pub use local::LocalAdapter;

use async_trait::async_trait;

use shared::client::{CustomerInfo, CustomerProfile, LoginChallenge, OrderDraft};
use shared::models::{Address, CartView, LineItem, Order};

use crate::error::ClientResult;

/// Operations every backend supports.
///
/// Cart mutations return the fresh snapshot so callers never hold stale
/// state. Auth operations return `Option` where a backend legitimately has
/// no notion of accounts: the local adapter answers `None`/`false` rather
/// than erroring.
#[async_trait]
pub trait CommerceAdapter: Send + Sync {
    // Cart
    async fn get_cart(&self) -> ClientResult<CartView>;
    async fn add_to_cart(&self, item: LineItem) -> ClientResult<CartView>;
    async fn update_quantity(&self, sku: &str, quantity: i64) -> ClientResult<CartView>;
    async fn remove_from_cart(&self, sku: &str) -> ClientResult<CartView>;
    async fn clear_cart(&self) -> ClientResult<CartView>;

    // Orders
    async fn create_order(&self, draft: OrderDraft) -> ClientResult<Order>;
    async fn get_order(&self, id: &str) -> ClientResult<Order>;
    async fn get_orders(&self) -> ClientResult<Vec<Order>>;

    // Auth
    async fn login(&self, email: &str) -> ClientResult<Option<LoginChallenge>>;
    async fn verify_code(
        &self,
        email: &str,
        code: &str,
        challenge: &LoginChallenge,
    ) -> ClientResult<Option<CustomerInfo>>;
    async fn logout(&self) -> ClientResult<()>;
    fn is_logged_in(&self) -> bool;
    fn get_customer(&self) -> Option<CustomerInfo>;

    // Account
    async fn get_customer_profile(&self) -> ClientResult<Option<CustomerProfile>>;
    async fn get_addresses(&self) -> ClientResult<Vec<Address>>;
}
