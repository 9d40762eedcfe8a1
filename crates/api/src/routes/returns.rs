//! Return handlers.
//!
//! One endpoint serves two actions, picked by the `action` field:
//! `getReturnableItems` lists what can be returned, `createReturn` opens a
//! return with each line's reason mapped to a Shopify return reason.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use shop_bridge_core::{FulfillmentLineItemGid, OrderGid, ReturnReason};
use tracing::instrument;

use super::{RawId, require_id};
use crate::error::AppError;
use crate::middleware::{JsonBody, RequestShop};
use crate::shopify::ReturnLineItemInput;
use crate::state::AppState;

/// Build the returns router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/orders/return", post(order_return))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub order_id: Option<RawId>,
    pub action: Option<String>,
    #[serde(default)]
    pub return_line_items: Vec<ReturnLineItemRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLineItemRequest {
    pub fulfillment_line_item_id: Option<RawId>,
    pub quantity: u32,
    pub return_reason: Option<String>,
}

impl ReturnLineItemRequest {
    fn into_input(self, index: usize) -> Result<ReturnLineItemInput, AppError> {
        let fulfillment_line_item_id: FulfillmentLineItemGid = require_id(
            self.fulfillment_line_item_id,
            &format!("returnLineItems[{index}].fulfillmentLineItemId is required"),
            &format!("returnLineItems[{index}].fulfillmentLineItemId"),
        )?;
        if self.quantity == 0 {
            return Err(AppError::Validation(format!(
                "returnLineItems[{index}].quantity must be at least 1"
            )));
        }
        Ok(ReturnLineItemInput {
            fulfillment_line_item_id,
            quantity: self.quantity,
            return_reason: ReturnReason::normalize(self.return_reason.as_deref()),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReturnableItemsResponse {
    success: bool,
    returnable_fulfillments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ReturnCreatedResponse {
    success: bool,
    #[serde(rename = "return")]
    created: Option<serde_json::Value>,
}

/// Dispatch a return action.
///
/// # Errors
///
/// Returns 400 for an unknown action, a missing order id or invalid lines,
/// and for errors Shopify reports.
#[instrument(skip(state, body), fields(shop = %shop, action = body.action.as_deref()))]
pub async fn order_return(
    State(state): State<AppState>,
    RequestShop(shop): RequestShop,
    JsonBody(body): JsonBody<ReturnRequest>,
) -> Result<Response, AppError> {
    match body.action.as_deref() {
        Some("getReturnableItems") => {
            let order_id: OrderGid = require_id(body.order_id, "orderId is required", "orderId")?;
            let credentials = state.credentials(&shop).await?;

            let returnable_fulfillments = state
                .upstream(
                    state
                        .shopify()
                        .get_returnable_fulfillments(&credentials, &order_id),
                )
                .await?;

            Ok(Json(ReturnableItemsResponse {
                success: true,
                returnable_fulfillments,
            })
            .into_response())
        }
        Some("createReturn") => {
            let order_id: OrderGid = require_id(body.order_id, "orderId is required", "orderId")?;
            if body.return_line_items.is_empty() {
                return Err(AppError::Validation(
                    "returnLineItems is required".to_string(),
                ));
            }
            let items = body
                .return_line_items
                .into_iter()
                .enumerate()
                .map(|(index, item)| item.into_input(index))
                .collect::<Result<Vec<_>, _>>()?;
            let credentials = state.credentials(&shop).await?;

            let created = state
                .upstream(
                    state
                        .shopify()
                        .create_return(&credentials, &order_id, &items),
                )
                .await?;

            Ok(Json(ReturnCreatedResponse {
                success: true,
                created,
            })
            .into_response())
        }
        _ => Err(AppError::Validation("Invalid action".to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::*;
    use crate::routes::tests::{json_request, send};

    #[tokio::test]
    async fn test_invalid_action() {
        let (status, body) = send(json_request(
            Method::POST,
            "/api/v1/orders/return",
            &serde_json::json!({"orderId": "5", "action": "refundEverything"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "Invalid action"})
        );
    }

    #[tokio::test]
    async fn test_missing_action() {
        let (status, body) = send(json_request(
            Method::POST,
            "/api/v1/orders/return",
            &serde_json::json!({"orderId": "5"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid action");
    }

    #[tokio::test]
    async fn test_create_return_requires_lines() {
        let (status, body) = send(json_request(
            Method::POST,
            "/api/v1/orders/return",
            &serde_json::json!({"orderId": "5", "action": "createReturn"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "returnLineItems is required");
    }

    #[tokio::test]
    async fn test_create_return_rejects_zero_quantity() {
        let (status, body) = send(json_request(
            Method::POST,
            "/api/v1/orders/return",
            &serde_json::json!({
                "orderId": "5",
                "action": "createReturn",
                "returnLineItems": [
                    {"fulfillmentLineItemId": "11", "quantity": 1, "returnReason": "Damaged"},
                    {"fulfillmentLineItemId": "12", "quantity": 0}
                ]
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "returnLineItems[1].quantity must be at least 1"
        );
    }

    #[test]
    fn test_line_reason_is_normalized() {
        let line = ReturnLineItemRequest {
            fulfillment_line_item_id: Some(RawId::Number(11)),
            quantity: 2,
            return_reason: Some("  Wrong Item Received ".to_string()),
        };
        let input = line.into_input(0).unwrap();
        assert_eq!(input.return_reason, ReturnReason::WrongItem);
        assert_eq!(
            input.fulfillment_line_item_id.as_str(),
            "gid://shopify/FulfillmentLineItem/11"
        );
    }

    #[test]
    fn test_line_without_reason_is_other() {
        let line = ReturnLineItemRequest {
            fulfillment_line_item_id: Some(RawId::Text("11".to_string())),
            quantity: 1,
            return_reason: None,
        };
        assert_eq!(line.into_input(0).unwrap().return_reason, ReturnReason::Other);
    }
}
