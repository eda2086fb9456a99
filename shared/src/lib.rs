//! Shared types for the storefront commerce core
//!
//! Domain models and wire DTOs used by the client core and, eventually,
//! by a matching backend implementation.

pub mod client;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use client::{
    AuthCallbackResponse, CustomerInfo, CustomerProfile, LoginChallenge, LoginRequest, OrderDraft,
    VerifyCodeRequest,
};
pub use models::{CART_SCHEMA_VERSION, CartView, LineItem, Order, StoredCartEnvelope};
