//! Cart Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Schema version for persisted cart envelopes.
///
/// Bump this whenever the persisted item shape changes. A stored envelope
/// with any other version is discarded wholesale on load; items are never
/// partially migrated.
pub const CART_SCHEMA_VERSION: u32 = 1;

/// A single cart line, keyed by SKU within a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub sku: String,
    pub name: String,
    /// Always >= 1; removal is the only way a line reaches zero.
    pub quantity: u32,
    /// Unit price.
    pub price: Decimal,
    pub currency: String,
    /// Product image URL or path.
    pub image: String,
    /// Product page path.
    pub url: String,
}

/// Read-only cart snapshot with derived totals.
///
/// `item_count` and `subtotal` are recomputed from the item set on every
/// read; they are never stored. Snapshots own their data, so no caller can
/// reach back into the live cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<LineItem>,
    /// Sum of quantities across all lines.
    pub item_count: u32,
    /// Sum of quantity x unit price across all lines.
    pub subtotal: Decimal,
    /// Derived shipping: always zero for the local backend, threshold rule
    /// for the API backend.
    pub shipping: Decimal,
}

impl CartView {
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

/// Versioned wrapper around persisted cart items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCartEnvelope {
    pub version: u32,
    pub items: Vec<LineItem>,
}

impl StoredCartEnvelope {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self {
            version: CART_SCHEMA_VERSION,
            items,
        }
    }
}
