//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Readiness (database)
//!
//! # Orders
//! POST   /api/v1/orders                - All orders of a customer, newest first
//! POST   /api/v1/order                 - One order by id
//! POST   /api/v1/orders/cancel         - Cancel, refund and restock an order
//! POST   /api/v1/orders/return         - Returnable items / create a return
//!
//! # Customers
//! POST   /api/v1/customers/create      - Create a customer
//! DELETE /api/v1/customers/delete      - Delete a customer
//! DELETE /api/v1/customers/erase-data  - Request erasure of a customer's data
//!
//! # Webhooks (HMAC-verified)
//! POST   /webhooks/app/scopes_update   - Granted scopes changed
//! POST   /webhooks/app/uninstalled     - App removed from a shop
//! ```
//!
//! API routes act on the shop named by `X-Shopify-Shop-Domain`, or the
//! configured default shop.

pub mod customers;
pub mod health;
pub mod orders;
pub mod returns;
pub mod webhooks;

use std::str::FromStr;

use axum::{
    Router,
    extract::Request,
    http::{Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use shop_bridge_core::GidError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(returns::router())
        .merge(customers::router())
        .merge(webhooks::router())
}

/// Build the application with its CORS, request-id and tracing layers.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    routes()
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(cors)
        .layer(middleware::from_fn(preflight_no_content))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Answer CORS preflights with 204 instead of the layer's empty 200.
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
        response.headers_mut().remove(header::CONTENT_LENGTH);
    }
    response
}

async fn method_not_allowed() -> Response {
    let body = serde_json::json!({ "success": false, "error": "Method not allowed" });
    (StatusCode::METHOD_NOT_ALLOWED, axum::Json(body)).into_response()
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// An id as clients send it: a string, or a bare number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// `"123"` or `"gid://shopify/Order/123"`.
    Text(String),
    /// `123`.
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Turn an optional client id into a GID.
///
/// Absent or blank ids fail with `missing`; anything else that is not an id
/// of the right resource fails naming `field`.
pub(crate) fn require_id<G>(raw: Option<RawId>, missing: &str, field: &str) -> Result<G, AppError>
where
    G: FromStr<Err = GidError>,
{
    let raw = raw
        .map(RawId::into_string)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation(missing.to_string()))?;
    raw.parse()
        .map_err(|e| AppError::Validation(format!("Invalid {field}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use axum::body::Body;
    use shop_bridge_core::{CustomerGid, OrderGid};
    use tower::ServiceExt;

    use super::*;
    use crate::state::tests::test_state;

    /// Send `request` to a fresh app and return status and JSON body.
    pub(crate) async fn send(
        request: axum::http::Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = app(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, body)
    }

    /// A JSON request for the default test shop.
    pub(crate) fn json_request(
        method: Method,
        uri: &str,
        body: &serde_json::Value,
    ) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_require_id_promotes_numbers() {
        let id: CustomerGid =
            require_id(Some(RawId::Number(42)), "customerId is required", "customerId").unwrap();
        assert_eq!(id.as_str(), "gid://shopify/Customer/42");

        let id: OrderGid = require_id(
            Some(RawId::Text("gid://shopify/Order/7".into())),
            "orderId is required",
            "orderId",
        )
        .unwrap();
        assert_eq!(id.as_str(), "gid://shopify/Order/7");
    }

    #[test]
    fn test_require_id_missing_and_blank() {
        for raw in [None, Some(RawId::Text("  ".into()))] {
            let err = require_id::<OrderGid>(raw, "orderId is required", "orderId").unwrap_err();
            assert_eq!(err.to_string(), "orderId is required");
        }
    }

    #[test]
    fn test_require_id_wrong_resource() {
        let err = require_id::<OrderGid>(
            Some(RawId::Text("gid://shopify/Customer/1".into())),
            "orderId is required",
            "orderId",
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Invalid orderId"));
    }

    #[tokio::test]
    async fn test_wrong_method_is_json_405() {
        let request = axum::http::Request::get("/api/v1/orders")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "Method not allowed"})
        );
    }

    #[tokio::test]
    async fn test_preflight_is_no_content() {
        let request = axum::http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/customers/delete")
            .header(header::ORIGIN, "https://storefront.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
            .body(Body::empty())
            .unwrap();
        let response = app(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_header_on_errors() {
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/v1/order")
            .header(header::ORIGIN, "https://storefront.example")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_malformed_json_uses_envelope() {
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/v1/orders")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn test_invalid_shop_header() {
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/v1/orders")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-shopify-shop-domain", "evil.example.com")
            .body(Body::from(r#"{"customerId":"1"}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid shop domain")
        );
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let request = axum::http::Request::get("/api/v2/orders")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }
}
