// API backend tests against a canned in-process HTTP server.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use storefront_client::{
    AUTH_STATE_CHANGED, Address, BackendKind, ClientConfig, ClientError, Commerce, HostContext,
    LineItem, OrderCustomer, OrderDraft,
};

type Responder = Arc<dyn Fn(&str, &str) -> (u16, String) + Send + Sync>;

/// Route client-core traces through the test harness; opt in with
/// `RUST_LOG=storefront_client=debug`.
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Minimal HTTP/1.1 server answering each request from a routing closure
/// keyed by method and path. One response per connection.
async fn spawn_server(respond: Responder) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                // Read the head, then any Content-Length body
                loop {
                    let Ok(n) = socket.read(&mut chunk).await else {
                        return;
                    };
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(head_end) = find_head_end(&buf) {
                        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
                        let body_len = content_length(&head);
                        if buf.len() >= head_end + 4 + body_len {
                            break;
                        }
                    }
                }

                let request = String::from_utf8_lossy(&buf);
                let mut parts = request.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let path = parts.next().unwrap_or_default().to_string();

                let (status, body) = respond(&method, &path);
                let reason = match status {
                    200 => "OK",
                    401 => "Unauthorized",
                    404 => "Not Found",
                    _ => "Error",
                };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0)
}

fn commerce_for(base_url: &str, host: HostContext) -> Commerce {
    init_tracing();
    Commerce::new(
        ClientConfig::new(base_url).with_backend(BackendKind::Api),
        host,
    )
}

fn item(sku: &str, quantity: u32, price: Decimal) -> LineItem {
    LineItem {
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        quantity,
        price,
        currency: "USD".to_string(),
        image: format!("/media/{sku}.png"),
        url: format!("/products/{sku}"),
    }
}

fn draft() -> OrderDraft {
    OrderDraft {
        customer: OrderCustomer {
            name: "Jo Doe".to_string(),
            email: "jo@example.com".to_string(),
        },
        shipping: Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            region: None,
            postcode: "12345".to_string(),
            country: "US".to_string(),
        },
    }
}

const ORDER_JSON: &str = r#"{
  "order": {
    "id": "ord-100",
    "customer": {"name": "Jo Doe", "email": "jo@example.com"},
    "shipping": {"street": "1 Main St", "city": "Springfield", "postcode": "12345", "country": "US"},
    "items": [{
      "sku": "SHIRT",
      "urlKey": "SHIRT",
      "name": "Product SHIRT",
      "quantity": 1,
      "price": {"currency": "USD", "final": "19.99"},
      "custom": {"image": "/media/SHIRT.png", "url": "/products/SHIRT"}
    }],
    "state": "processing",
    "createdAt": "2026-08-27T12:00:00Z"
  }
}"#;

#[tokio::test]
async fn login_and_verify_establish_a_session() {
    let base_url = spawn_server(Arc::new(|method: &str, path: &str| {
        match (method, path) {
            ("POST", "/auth/login") => (200, r#"{"hash":"abc123","exp":1790000000}"#.to_string()),
            ("POST", "/auth/callback") => (
                200,
                r#"{"token":"tok-1","email":"jo@example.com","roles":["customer"]}"#.to_string(),
            ),
            ("GET", "/customers/jo@example.com") => (
                200,
                r#"{"email":"jo@example.com","firstName":"Jo","lastName":"Doe","roles":["customer"]}"#
                    .to_string(),
            ),
            _ => (404, String::new()),
        }
    }))
    .await;

    let commerce = commerce_for(&base_url, HostContext::in_memory());

    let events: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let events_inner = Arc::clone(&events);
    let _sub = commerce.events().subscribe(AUTH_STATE_CHANGED, move |detail| {
        events_inner.lock().unwrap().push(detail.clone());
    });

    let challenge = commerce.login("jo@example.com").await.unwrap().unwrap();
    assert_eq!(challenge.hash, "abc123");
    assert!(!commerce.is_logged_in().await.unwrap());

    let customer = commerce
        .verify_code("jo@example.com", "123456", &challenge)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.email, "jo@example.com");
    assert!(commerce.is_logged_in().await.unwrap());

    let profile = commerce.get_customer_profile().await.unwrap().unwrap();
    assert_eq!(profile.first_name.as_deref(), Some("Jo"));

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["loggedIn"], true);
    assert_eq!(events[0]["email"], "jo@example.com");
}

#[tokio::test]
async fn rejected_token_tears_the_session_down() {
    let base_url = spawn_server(Arc::new(|method: &str, path: &str| {
        match (method, path) {
            ("POST", "/auth/login") => (200, r#"{"hash":"abc123","exp":1790000000}"#.to_string()),
            ("POST", "/auth/callback") => (
                200,
                r#"{"token":"tok-stale","email":"jo@example.com"}"#.to_string(),
            ),
            // Every authenticated read is rejected
            _ => (401, String::new()),
        }
    }))
    .await;

    let commerce = commerce_for(&base_url, HostContext::in_memory());

    let events: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let events_inner = Arc::clone(&events);
    let _sub = commerce.events().subscribe(AUTH_STATE_CHANGED, move |detail| {
        events_inner.lock().unwrap().push(detail.clone());
    });

    let challenge = commerce.login("jo@example.com").await.unwrap().unwrap();
    commerce
        .verify_code("jo@example.com", "123456", &challenge)
        .await
        .unwrap();
    assert!(commerce.is_logged_in().await.unwrap());

    let result = commerce.get_orders().await;
    assert!(matches!(result, Err(ClientError::SessionExpired)));

    // Session gone and announced with a reason
    assert!(!commerce.is_logged_in().await.unwrap());
    assert!(commerce.get_customer().await.unwrap().is_none());

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1]["loggedIn"], false);
    assert_eq!(events[1]["email"], Value::Null);
    assert_eq!(events[1]["reason"], "token_expired");
}

#[tokio::test]
async fn create_order_round_trips_the_envelope() {
    let base_url = spawn_server(Arc::new(|method: &str, path: &str| {
        match (method, path) {
            ("POST", "/orders") => (200, ORDER_JSON.to_string()),
            ("GET", "/orders/ord-100") => (200, ORDER_JSON.to_string()),
            _ => (404, String::new()),
        }
    }))
    .await;

    let commerce = commerce_for(&base_url, HostContext::in_memory());
    commerce
        .add_to_cart(item("SHIRT", 1, Decimal::new(1999, 2)))
        .await
        .unwrap();

    let order = commerce.create_order(draft()).await.unwrap();
    assert_eq!(order.id, "ord-100");
    assert_eq!(order.state, "processing");
    assert_eq!(order.items[0].price.r#final, "19.99");

    let fetched = commerce.get_order("ord-100").await.unwrap();
    assert_eq!(fetched.id, "ord-100");
}

#[tokio::test]
async fn backend_failure_surfaces_status_and_message() {
    let base_url = spawn_server(Arc::new(|_: &str, _: &str| {
        (500, r#"{"error":"boom"}"#.to_string())
    }))
    .await;

    let commerce = commerce_for(&base_url, HostContext::in_memory());
    commerce
        .add_to_cart(item("SHIRT", 1, Decimal::new(1999, 2)))
        .await
        .unwrap();

    let err = commerce.create_order(draft()).await.unwrap_err();
    match err {
        ClientError::Backend { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("boom"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn anonymous_order_submission_needs_no_session() {
    let base_url = spawn_server(Arc::new(|method: &str, path: &str| {
        if method == "POST" && path == "/orders" {
            (200, ORDER_JSON.to_string())
        } else {
            (404, String::new())
        }
    }))
    .await;

    let commerce = commerce_for(&base_url, HostContext::in_memory());
    assert!(!commerce.is_logged_in().await.unwrap());
    commerce
        .add_to_cart(item("SHIRT", 1, Decimal::new(1999, 2)))
        .await
        .unwrap();

    let order = commerce.create_order(draft()).await.unwrap();
    assert_eq!(order.id, "ord-100");
}
