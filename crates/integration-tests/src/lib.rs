//! Integration tests for Shop Bridge.
//!
//! The tests in `tests/` talk to a running API server and are ignored by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and store a session for the test shop
//! cargo run -p shop-bridge-cli -- migrate
//! cargo run -p shop-bridge-cli -- session upsert --shop $TEST_SHOP --token $SHOPIFY_ACCESS_TOKEN
//!
//! # Start the server, then run the ignored tests
//! cargo run -p shop-bridge-api &
//! cargo test -p shop-bridge-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - Server under test (default `http://localhost:3002`)
//! - `TEST_SHOP` - Shop with a stored offline session
//! - `SHOPIFY_API_SECRET` - App secret, used to sign webhooks
//! - `TEST_CUSTOMER_ID` - A customer of the test shop with orders

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Base URL of the server under test.
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3002".to_string())
}

/// Shop the tests act on, if configured.
#[must_use]
pub fn test_shop() -> Option<String> {
    std::env::var("TEST_SHOP").ok()
}

/// Sign a webhook body the way Shopify does.
///
/// Returns `None` if `secret` cannot key an HMAC.
#[must_use]
pub fn sign_webhook(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// A client request builder with the test shop header set.
#[must_use]
pub fn request(client: &reqwest::Client, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
    let builder = client.request(method, format!("{}{path}", api_base_url()));
    match test_shop() {
        Some(shop) => builder.header("x-shopify-shop-domain", shop),
        None => builder,
    }
}
