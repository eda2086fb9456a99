//! Client-related types shared between the commerce core and the backend
//!
//! Request/response DTOs for the auth and order endpoints. These types are
//! the wire contract; field names follow the backend's JSON exactly.

use serde::{Deserialize, Serialize};

use crate::models::{Address, Order, OrderCustomer, OrderItem};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// `POST /auth/login` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// `POST /auth/login` response: the opaque one-time-code verification
/// handle the caller must echo back on verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginChallenge {
    pub hash: String,
    pub exp: u64,
}

/// `POST /auth/callback` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
    pub hash: String,
    pub exp: u64,
}

/// `POST /auth/callback` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCallbackResponse {
    pub token: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Customer identity persisted durably for UI pre-fill. Not a trust
/// boundary: the bearer token is the only credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// `GET /customers/{email}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

// =============================================================================
// Order API DTOs
// =============================================================================

/// Caller-supplied half of an order: who it is for and where it ships.
/// The adapter supplies the item list from its own cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub customer: OrderCustomer,
    pub shipping: Address,
}

/// `POST /orders` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer: OrderCustomer,
    pub shipping: Address,
    pub items: Vec<OrderItem>,
}

/// `{order}` wrapper returned by `POST /orders` and `GET /orders/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEnvelope {
    pub order: Order,
}

/// `{orders}` wrapper returned by `GET /customers/{email}/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListEnvelope {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// `{addresses}` wrapper returned by `GET /customers/{email}/addresses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressListEnvelope {
    #[serde(default)]
    pub addresses: Vec<Address>,
}
