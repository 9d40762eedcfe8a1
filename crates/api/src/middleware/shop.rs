//! Shop resolution for API requests.
//!
//! The shop a request acts on comes from the `X-Shopify-Shop-Domain` header,
//! falling back to the configured default shop.

use axum::{extract::FromRequestParts, http::request::Parts};
use shop_bridge_core::ShopDomain;

use crate::error::AppError;
use crate::shopify::webhook::SHOP_DOMAIN_HEADER;
use crate::state::AppState;

/// Extractor for the shop a request is about.
///
/// Rejects with 400 if the header is not a `*.myshopify.com` domain, or if
/// neither the header nor a default shop is available.
#[derive(Debug, Clone)]
pub struct RequestShop(pub ShopDomain);

impl FromRequestParts<AppState> for RequestShop {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(SHOP_DOMAIN_HEADER) else {
            return state
                .config()
                .shopify
                .default_shop
                .clone()
                .map(Self)
                .ok_or_else(|| AppError::Validation("Shop domain is required".to_string()));
        };

        let raw = header
            .to_str()
            .map_err(|_| AppError::Validation("Invalid shop domain".to_string()))?;
        ShopDomain::parse(raw)
            .map(Self)
            .map_err(|e| AppError::Validation(format!("Invalid shop domain: {e}")))
    }
}
