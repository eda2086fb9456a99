//! Order wire normalization
//!
//! Line items leave the cart in client shape and cross the wire in
//! catalog shape: the product URL collapses to its trailing `urlKey`
//! segment, the image drops its host, and the unit price becomes a
//! `{currency, final}` pair with the amount as a string.

use rust_decimal::Decimal;
use url::Url;

use shared::models::{ItemCustom, ItemPrice, LineItem, OrderItem};

/// Currency used when a line item carries none.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Converts a cart snapshot into wire order items.
pub fn to_wire_items(items: &[LineItem]) -> Vec<OrderItem> {
    items.iter().map(to_wire_item).collect()
}

fn to_wire_item(item: &LineItem) -> OrderItem {
    let currency = if item.currency.is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        item.currency.clone()
    };
    OrderItem {
        sku: item.sku.clone(),
        url_key: url_key(&item.url),
        name: item.name.clone(),
        quantity: item.quantity,
        price: ItemPrice {
            currency,
            r#final: format_amount(item.price),
        },
        custom: ItemCustom {
            image: normalize_image(&item.image),
            url: item.url.clone(),
        },
    }
}

fn format_amount(amount: Decimal) -> String {
    amount.to_string()
}

/// Last path segment of a product URL, with query and fragment stripped.
/// Works for absolute URLs and bare paths alike; an empty path yields an
/// empty key.
pub fn url_key(product_url: &str) -> String {
    let path = match Url::parse(product_url) {
        Ok(url) => url.path().to_string(),
        // Bare path: strip query and fragment by hand
        Err(_) => product_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Drops the scheme and host from an absolute image URL, keeping the
/// path. A value that does not parse as an absolute URL (already a path)
/// passes through untouched.
pub fn normalize_image(image: &str) -> String {
    match Url::parse(image) {
        Ok(url) => url.path().to_string(),
        Err(_) => image.to_string(),
    }
}
