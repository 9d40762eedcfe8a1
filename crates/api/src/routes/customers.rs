//! Customer handlers: create, delete and data erasure.

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, post},
};
use serde::{Deserialize, Serialize};
use shop_bridge_core::{CustomerGid, Email};
use tracing::instrument;

use super::{RawId, require_id};
use crate::error::AppError;
use crate::middleware::{JsonBody, RequestShop};
use crate::shopify::{CreatedCustomer, CustomerInput};
use crate::state::AppState;

/// Shown with every erasure request; Shopify keeps order data for 180 days.
const ERASURE_NOTE: &str =
    "For customers with orders: Data will be erased after 180 days as per Shopify's retention policy";

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/customers/create", post(create_customer))
        .route("/api/v1/customers/delete", delete(delete_customer))
        .route("/api/v1/customers/erase-data", delete(erase_customer_data))
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub input: Option<CustomerFields>,
}

/// Customer fields as the client sends them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFields {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl TryFrom<CustomerFields> for CustomerInput {
    type Error = AppError;

    fn try_from(fields: CustomerFields) -> Result<Self, Self::Error> {
        let email = fields
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AppError::Validation("email is required".to_string()))?;
        let email =
            Email::parse(&email).map_err(|e| AppError::Validation(format!("Invalid email: {e}")))?;

        Self {
            first_name: fields.first_name,
            last_name: fields.last_name,
            email,
            phone: fields.phone,
        }
        .validate()
        .map_err(AppError::Validation)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateCustomerResponse {
    pub success: bool,
    pub message: &'static str,
    pub customer: CreatedCustomer,
}

/// Create a customer.
///
/// # Errors
///
/// Returns 400 for missing or invalid fields and for Shopify's user errors
/// (e.g. an email that is already taken).
#[instrument(skip(state, body), fields(shop = %shop))]
pub async fn create_customer(
    State(state): State<AppState>,
    RequestShop(shop): RequestShop,
    JsonBody(body): JsonBody<CreateCustomerRequest>,
) -> Result<Json<CreateCustomerResponse>, AppError> {
    let input = CustomerInput::try_from(
        body.input
            .ok_or_else(|| AppError::Validation("input is required".to_string()))?,
    )?;
    let credentials = state.credentials(&shop).await?;

    let customer = state
        .upstream(state.shopify().create_customer(&credentials, &input))
        .await?;

    Ok(Json(CreateCustomerResponse {
        success: true,
        message: "Customer created successfully.",
        customer,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CustomerIdRequest {
    pub id: Option<RawId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRemovalResponse {
    pub success: bool,
    pub method: &'static str,
    pub customer_id: String,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

/// Permanently delete a customer.
///
/// # Errors
///
/// Returns 400 without an id, or when Shopify refuses the deletion (for
/// example because the customer has orders).
#[instrument(skip(state, body), fields(shop = %shop))]
pub async fn delete_customer(
    State(state): State<AppState>,
    RequestShop(shop): RequestShop,
    JsonBody(body): JsonBody<CustomerIdRequest>,
) -> Result<Json<CustomerRemovalResponse>, AppError> {
    let id: CustomerGid = require_id(body.id, "Customer ID is required", "id")?;
    let credentials = state.credentials(&shop).await?;

    let customer_id = state
        .upstream(state.shopify().delete_customer(&credentials, &id))
        .await?;

    Ok(Json(CustomerRemovalResponse {
        success: true,
        method: "delete",
        customer_id,
        message: "Customer deleted successfully",
        note: None,
    }))
}

/// Ask Shopify to erase a customer's personal data.
///
/// # Errors
///
/// Returns 400 without an id, or when Shopify refuses the request.
#[instrument(skip(state, body), fields(shop = %shop))]
pub async fn erase_customer_data(
    State(state): State<AppState>,
    RequestShop(shop): RequestShop,
    JsonBody(body): JsonBody<CustomerIdRequest>,
) -> Result<Json<CustomerRemovalResponse>, AppError> {
    let id: CustomerGid = require_id(body.id, "Customer ID is required", "id")?;
    let credentials = state.credentials(&shop).await?;

    let customer_id = state
        .upstream(
            state
                .shopify()
                .request_customer_data_erasure(&credentials, &id),
        )
        .await?;

    Ok(Json(CustomerRemovalResponse {
        success: true,
        method: "erasure",
        customer_id,
        message: "Data erasure request submitted",
        note: Some(ERASURE_NOTE),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::*;
    use crate::routes::tests::{json_request, send};

    fn fields() -> CustomerFields {
        CustomerFields {
            first_name: " Jane ".to_string(),
            last_name: "Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            phone: Some("+14155550123".to_string()),
        }
    }

    #[test]
    fn test_fields_into_input() {
        let input = CustomerInput::try_from(fields()).unwrap();
        assert_eq!(input.first_name, "Jane");
        assert_eq!(input.email.as_str(), "jane@example.com");
        assert_eq!(input.phone.as_deref(), Some("+14155550123"));
    }

    #[test]
    fn test_fields_require_email() {
        let err = CustomerInput::try_from(CustomerFields {
            email: None,
            ..fields()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "email is required");

        let err = CustomerInput::try_from(CustomerFields {
            email: Some("jane.example.com".to_string()),
            ..fields()
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("Invalid email"));
    }

    #[test]
    fn test_fields_require_names() {
        let err = CustomerInput::try_from(CustomerFields {
            last_name: "   ".to_string(),
            ..fields()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "lastName is required");
    }

    #[tokio::test]
    async fn test_create_requires_input() {
        let (status, body) = send(json_request(
            Method::POST,
            "/api/v1/customers/create",
            &serde_json::json!({"firstName": "Jane"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "input is required");
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let (status, body) = send(json_request(
            Method::DELETE,
            "/api/v1/customers/delete",
            &serde_json::json!({}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "Customer ID is required"})
        );
    }

    #[tokio::test]
    async fn test_erase_requires_id() {
        let (status, body) = send(json_request(
            Method::DELETE,
            "/api/v1/customers/erase-data",
            &serde_json::json!({"id": null}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Customer ID is required");
    }

    #[tokio::test]
    async fn test_delete_is_delete_only() {
        let (status, body) = send(json_request(
            Method::POST,
            "/api/v1/customers/delete",
            &serde_json::json!({"id": "42"}),
        ))
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }

    #[test]
    fn test_erasure_response_shape() {
        let response = CustomerRemovalResponse {
            success: true,
            method: "erasure",
            customer_id: "gid://shopify/Customer/42".to_string(),
            message: "Data erasure request submitted",
            note: Some(ERASURE_NOTE),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["customerId"], "gid://shopify/Customer/42");
        assert_eq!(json["method"], "erasure");
        assert!(json["note"].as_str().unwrap().contains("180 days"));
    }
}
