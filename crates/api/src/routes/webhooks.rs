//! Shopify app lifecycle webhooks.
//!
//! Both handlers verify the HMAC of the raw body before reading it and act on
//! the shop named in `X-Shopify-Shop-Domain`.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use serde::Serialize;
use shop_bridge_core::ShopDomain;
use tracing::instrument;

use crate::error::AppError;
use crate::shopify::webhook::{
    HMAC_HEADER, SHOP_DOMAIN_HEADER, ScopesUpdatePayload, TOPIC_HEADER, verify_hmac,
};
use crate::state::AppState;

/// Build the webhooks router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhooks/app/scopes_update", post(scopes_update))
        .route("/webhooks/app/uninstalled", post(app_uninstalled))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Check the signature and return the shop the webhook is about.
fn authenticate(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<ShopDomain, AppError> {
    verify_hmac(
        &state.config().shopify.api_secret,
        body,
        header(headers, HMAC_HEADER),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, topic = header(headers, TOPIC_HEADER), "Rejected webhook");
        AppError::Unauthorized(e.to_string())
    })?;

    let shop = header(headers, SHOP_DOMAIN_HEADER)
        .ok_or_else(|| AppError::Validation("Missing shop domain".to_string()))?;
    ShopDomain::parse(shop).map_err(|e| AppError::Validation(format!("Invalid shop domain: {e}")))
}

/// Record the scopes a shop granted the app.
///
/// Answers 200 even when the shop has no stored session.
///
/// # Errors
///
/// Returns 401 for a bad signature and 400 for an unreadable payload.
#[instrument(skip_all)]
pub async fn scopes_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let shop = authenticate(&state, &headers, &body)?;
    let payload: ScopesUpdatePayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid webhook payload: {e}")))?;

    let updated = state
        .sessions()
        .update_scopes(&shop, &payload.current)
        .await?;

    if updated == 0 {
        tracing::info!(shop = %shop, "Scopes updated for a shop without sessions");
    } else {
        tracing::info!(
            shop = %shop,
            sessions = updated,
            previous = %payload.previous.join(","),
            current = %payload.current.join(","),
            "Scopes updated"
        );
    }

    Ok(StatusCode::OK)
}

#[derive(Debug, Serialize)]
pub struct UninstalledResponse {
    pub message: &'static str,
    pub success: bool,
}

/// Forget a shop that removed the app.
///
/// # Errors
///
/// Returns 401 for a bad signature and 500 if the sessions cannot be deleted.
#[instrument(skip_all)]
pub async fn app_uninstalled(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UninstalledResponse>, AppError> {
    let shop = authenticate(&state, &headers, &body)?;

    let deleted = state.sessions().delete_by_shop(&shop).await?;
    tracing::info!(shop = %shop, sessions = deleted, "App uninstalled");

    Ok(Json(UninstalledResponse {
        message: "Successfully uninstalled",
        success: true,
    }))
}
