//! Client-resident commerce core
//!
//! A host application constructs a [`Commerce`] facade with a
//! [`ClientConfig`] and a [`HostContext`] (its storage and cookie
//! surfaces), subscribes to the [`EventBus`], and drives cart, order, and
//! auth operations through the facade. The backend adapter (local or API)
//! is resolved once, lazily, on first use.
//!
//! ```no_run
//! use storefront_client::{ClientConfig, Commerce, HostContext};
//!
//! # async fn run() -> storefront_client::ClientResult<()> {
//! let commerce = Commerce::new(
//!     ClientConfig::new("http://localhost:8080"),
//!     HostContext::in_memory(),
//! );
//! let cart = commerce.get_cart().await?;
//! assert!(cart.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod cart;
pub mod config;
pub mod error;
pub mod events;
pub mod facade;
pub mod http;
pub mod order;
pub mod session;
pub mod storage;

pub use adapter::{ApiAdapter, CommerceAdapter, LocalAdapter};
pub use cart::{CART_COUNT_COOKIE, CART_STORAGE_KEY, CartStore, LOCAL_CART_STORAGE_KEY, ShippingRule};
pub use config::{BackendKind, ClientConfig};
pub use error::{ClientError, ClientResult};
pub use events::{
    AUTH_STATE_CHANGED, CART_EMPTY, CART_UPDATED, EventBus, ORDER_CREATED, Subscription,
};
pub use facade::{BACKEND_OVERRIDE_KEY, Commerce};
pub use session::SessionManager;
pub use storage::{CookieSink, FileStorage, HostContext, MemoryCookieJar, MemoryStorage, StorageArea};

// Wire and model types live in `shared`; re-exported for host convenience.
pub use shared::client::{CustomerInfo, CustomerProfile, LoginChallenge, OrderDraft};
pub use shared::models::{Address, CartView, LineItem, Order, OrderCustomer, StoredCartEnvelope};
