//! Order handlers: customer order history, lookup and cancellation.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use shop_bridge_core::{CustomerGid, OrderGid, Termination, fetch_all};
use tracing::instrument;

use super::{RawId, require_id};
use crate::error::AppError;
use crate::middleware::{JsonBody, RequestShop};
use crate::shopify::{CustomerOrdersSource, Job, Order, OrderCancellation};
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/orders", post(customer_orders))
        .route("/api/v1/order", post(get_order))
        .route("/api/v1/orders/cancel", post(cancel_order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrdersRequest {
    pub customer_id: Option<RawId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrdersResponse {
    pub success: bool,
    pub total_orders: usize,
    pub orders: Vec<Order>,
}

/// List every order of a customer, newest first.
///
/// # Errors
///
/// Returns 400 without a customer id, or when Shopify rejects a page query.
/// A failure on any page fails the whole request.
#[instrument(skip(state, body), fields(shop = %shop))]
pub async fn customer_orders(
    State(state): State<AppState>,
    RequestShop(shop): RequestShop,
    JsonBody(body): JsonBody<CustomerOrdersRequest>,
) -> Result<Json<CustomerOrdersResponse>, AppError> {
    let customer_id: CustomerGid =
        require_id(body.customer_id, "customerId is required", "customerId")?;
    let credentials = state.credentials(&shop).await?;

    let source = CustomerOrdersSource::new(state.shopify(), &credentials);
    let collected = state
        .upstream(fetch_all(
            &source,
            customer_id.as_str(),
            state.config().orders,
        ))
        .await?;

    if collected.termination == Termination::MissingCursor {
        tracing::warn!(
            customer_id = %customer_id,
            pages = collected.pages_fetched,
            "Order history may be incomplete"
        );
    }
    tracing::info!(
        total = collected.total_count,
        pages = collected.pages_fetched,
        "Fetched customer orders"
    );

    Ok(Json(CustomerOrdersResponse {
        success: true,
        total_orders: collected.total_count,
        orders: collected.items,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOrderRequest {
    pub order_id: Option<RawId>,
}

#[derive(Debug, Serialize)]
pub struct GetOrderResponse {
    pub success: bool,
    pub order: Order,
}

/// Look up one order.
///
/// # Errors
///
/// Returns 400 without an order id and 404 if Shopify has no such order.
#[instrument(skip(state, body), fields(shop = %shop))]
pub async fn get_order(
    State(state): State<AppState>,
    RequestShop(shop): RequestShop,
    JsonBody(body): JsonBody<GetOrderRequest>,
) -> Result<Json<GetOrderResponse>, AppError> {
    let order_id: OrderGid = require_id(body.order_id, "orderId is required", "orderId")?;
    let credentials = state.credentials(&shop).await?;

    let order = state
        .upstream(state.shopify().get_order(&credentials, &order_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(GetOrderResponse {
        success: true,
        order,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    pub id: Option<RawId>,
    pub reason: Option<String>,
    pub staff_note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelOrderResponse {
    pub success: bool,
    pub job: Option<Job>,
}

/// Cancel an order, refunding and restocking it and notifying the customer.
///
/// The free-text reason is mapped to a Shopify cancel reason and kept as
/// the staff note.
///
/// # Errors
///
/// Returns 400 without an order id, or with Shopify's user errors.
#[instrument(skip(state, body), fields(shop = %shop))]
pub async fn cancel_order(
    State(state): State<AppState>,
    RequestShop(shop): RequestShop,
    JsonBody(body): JsonBody<CancelOrderRequest>,
) -> Result<Json<CancelOrderResponse>, AppError> {
    let order_id: OrderGid = require_id(body.id, "Order ID is required", "id")?;
    let cancellation = OrderCancellation::from_request(
        order_id,
        body.reason.as_deref(),
        body.staff_note.as_deref(),
    );
    let credentials = state.credentials(&shop).await?;

    let job = state
        .upstream(state.shopify().cancel_order(&credentials, &cancellation))
        .await?;

    Ok(Json(CancelOrderResponse { success: true, job }))
}
