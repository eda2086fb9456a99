//! Order Model
//!
//! Wire shapes for order submission and retrieval. These mirror the
//! backend contract exactly: `POST /orders` takes `{customer, shipping,
//! items}` and echoes `{order}` back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Customer identity attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub name: String,
    pub email: String,
}

/// Shipping address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub postcode: String,
    pub country: String,
}

/// Wire-shape price: currency plus the stringified unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPrice {
    pub currency: String,
    pub r#final: String,
}

/// Display metadata carried alongside each wire item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCustom {
    pub image: String,
    pub url: String,
}

/// One line of an order in wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub sku: String,
    /// Last path segment of the product URL.
    pub url_key: String,
    pub name: String,
    pub quantity: u32,
    pub price: ItemPrice,
    pub custom: ItemCustom,
}

/// An order as echoed by the backend (or synthesized locally).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer: OrderCustomer,
    pub shipping: Address,
    pub items: Vec<OrderItem>,
    /// Backend-defined state string (e.g. "completed").
    pub state: String,
    pub created_at: DateTime<Utc>,
}
