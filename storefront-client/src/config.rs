//! Client configuration

use std::time::Duration;

use rust_decimal::Decimal;

/// Backend the facade resolves at startup.
///
/// Selection happens exactly once per [`Commerce`](crate::Commerce)
/// instance: a persisted override in durable storage wins over the
/// compiled-in default carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// In-memory orders, synchronously persisted cart, no authentication.
    #[default]
    Local,
    /// Network-backed adapter speaking the order/auth wire contract.
    Api,
}

impl BackendKind {
    /// Parses a persisted override value. Unknown values select nothing,
    /// so a corrupt override falls through to the configured default.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "local" => Some(Self::Local),
            "api" => Some(Self::Api),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Api => "api",
        }
    }
}

/// Configuration for the commerce core.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g. "http://localhost:8080")
    pub base_url: String,

    /// Compiled-in default backend; a persisted override wins over it.
    pub backend: BackendKind,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Quiet period for the debounced cart writer (API backend).
    pub cart_write_debounce: Duration,

    /// Subtotal at or above which shipping is free (API backend).
    pub free_shipping_threshold: Decimal,

    /// Flat shipping fee charged below the threshold (API backend).
    pub flat_shipping_fee: Decimal,

    /// Lifetime of the mirrored cart-count cookie.
    pub cart_cookie_max_age: Duration,
}

impl ClientConfig {
    /// Create a new configuration with defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            backend: BackendKind::default(),
            timeout: 30,
            cart_write_debounce: Duration::from_millis(300),
            free_shipping_threshold: Decimal::new(50, 0),
            flat_shipping_fee: Decimal::new(599, 2),
            cart_cookie_max_age: Duration::from_secs(30 * 24 * 60 * 60),
        }
    }

    /// Set the compiled-in default backend
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the debounce quiet period for cart writes
    pub fn with_cart_write_debounce(mut self, window: Duration) -> Self {
        self.cart_write_debounce = window;
        self
    }

    /// Set the free-shipping threshold and the flat fee below it
    pub fn with_shipping(mut self, free_over: Decimal, flat_fee: Decimal) -> Self {
        self.free_shipping_threshold = free_over;
        self.flat_shipping_fee = flat_fee;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
