//! Domain models

pub mod cart;
pub mod order;

pub use cart::{CART_SCHEMA_VERSION, CartView, LineItem, StoredCartEnvelope};
pub use order::{Address, ItemCustom, ItemPrice, Order, OrderCustomer, OrderItem};
