//! Integration tests for the app lifecycle webhooks.
//!
//! These tests require the API server running with the same
//! `SHOPIFY_API_SECRET` as the test environment.

use reqwest::{Client, StatusCode};
use shop_bridge_integration_tests::{api_base_url, sign_webhook};

const SCOPES_BODY: &str = r#"{"current":["read_orders","write_orders"],"previous":["read_orders"]}"#;

fn secret() -> String {
    std::env::var("SHOPIFY_API_SECRET").expect("SHOPIFY_API_SECRET not set")
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_unsigned_webhook_is_rejected() {
    let resp = Client::new()
        .post(format!("{}/webhooks/app/scopes_update", api_base_url()))
        .header("x-shopify-shop-domain", "acme.myshopify.com")
        .body(SCOPES_BODY)
        .send()
        .await
        .expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_scopes_update_for_unknown_shop() {
    let signature = sign_webhook(&secret(), SCOPES_BODY.as_bytes()).expect("signature");
    let resp = Client::new()
        .post(format!("{}/webhooks/app/scopes_update", api_base_url()))
        .header("x-shopify-shop-domain", "no-such-shop.myshopify.com")
        .header("x-shopify-hmac-sha256", signature)
        .body(SCOPES_BODY)
        .send()
        .await
        .expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_uninstall_unknown_shop() {
    let body = r#"{"id":1,"name":"No Such Shop"}"#;
    let signature = sign_webhook(&secret(), body.as_bytes()).expect("signature");
    let resp = Client::new()
        .post(format!("{}/webhooks/app/uninstalled", api_base_url()))
        .header("x-shopify-shop-domain", "no-such-shop.myshopify.com")
        .header("x-shopify-hmac-sha256", signature)
        .body(body)
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = resp.json().await.expect("JSON body");
    assert_eq!(json["message"], "Successfully uninstalled");
    assert_eq!(json["success"], true);
}
