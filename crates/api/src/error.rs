//! Unified error handling for the API.
//!
//! Every failure leaves the service as `{"success": false, "error": ...}`.
//! `error` is a message, or the list of errors Shopify reported when it
//! rejected a query or mutation.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shop_bridge_core::{PaginationError, ShopDomain};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::shopify::{ShopifyError, UserError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request is missing something or carries invalid values.
    #[error("{0}")]
    Validation(String),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// A paginated collection did not end within the page bound.
    #[error("Pagination aborted after {0} pages")]
    PageLimit(u32),

    /// Shopify did not answer within the configured timeout.
    #[error("Upstream request timed out")]
    Timeout,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// The caller could not be authenticated (webhook signature).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// No offline session is stored for the shop.
    #[error("No Shopify session for {0}")]
    SessionNotFound(ShopDomain),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PaginationError<ShopifyError>> for AppError {
    fn from(err: PaginationError<ShopifyError>) -> Self {
        match err {
            PaginationError::Source { source, .. } => Self::Shopify(source),
            PaginationError::PageLimitExceeded { max_pages } => Self::PageLimit(max_pages),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout
    }
}

/// The `error` field of a failure response.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ErrorBody {
    Message(String),
    Upstream(Vec<UserError>),
}

#[derive(Debug, Serialize)]
struct Failure {
    success: bool,
    error: ErrorBody,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Shopify(e) if e.details().is_some() => StatusCode::BAD_REQUEST,
            Self::Shopify(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Shopify(_) | Self::PageLimit(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::SessionNotFound(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Shopify(e) => e.details().map_or_else(
                || {
                    let message = if e.is_timeout() {
                        "Upstream request timed out"
                    } else {
                        "Upstream request failed"
                    };
                    ErrorBody::Message(message.to_string())
                },
                ErrorBody::Upstream,
            ),
            Self::PageLimit(_) => ErrorBody::Message("Upstream request failed".to_string()),
            Self::SessionNotFound(_) => ErrorBody::Message("Shopify session not found".to_string()),
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => {
                ErrorBody::Message("Internal server error".to_string())
            }
            _ => ErrorBody::Message(self.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = Failure {
            success: false,
            error: self.body(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error() {
        let (status, body) = render(AppError::Validation("customerId is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "customerId is required"})
        );
    }

    #[tokio::test]
    async fn test_user_errors_are_listed() {
        let err = AppError::Shopify(ShopifyError::UserErrors(vec![UserError {
            message: "Order has already been cancelled".into(),
            field: Some(vec!["orderId".into()]),
            code: Some("INVALID".into()),
        }]));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            serde_json::json!([{
                "message": "Order has already been cancelled",
                "field": ["orderId"],
                "code": "INVALID"
            }])
        );
    }

    #[tokio::test]
    async fn test_transport_errors_are_hidden() {
        let (status, body) = render(AppError::Shopify(ShopifyError::RateLimited(30))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Upstream request failed");

        let (status, _) = render(AppError::Shopify(ShopifyError::Unauthorized("x".into()))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_session_not_found() {
        let shop = ShopDomain::parse("acme.myshopify.com").unwrap();
        let (status, body) = render(AppError::SessionNotFound(shop)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Shopify session not found");
    }

    #[tokio::test]
    async fn test_timeout() {
        let (status, body) = render(AppError::Timeout).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "Upstream request timed out");
    }

    #[tokio::test]
    async fn test_not_found_and_unauthorized() {
        let (status, body) = render(AppError::NotFound("Order not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Order not found");

        let (status, _) = render(AppError::Unauthorized("bad signature".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = render(AppError::Internal("pool exhausted".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_pagination_errors_convert() {
        let err = AppError::from(PaginationError::<ShopifyError>::PageLimitExceeded {
            max_pages: 200,
        });
        assert!(matches!(err, AppError::PageLimit(200)));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

        let err = AppError::from(PaginationError::Source {
            page: 3,
            source: ShopifyError::GraphQL(vec![]),
        });
        assert!(matches!(err, AppError::Shopify(ShopifyError::GraphQL(_))));
    }
}
