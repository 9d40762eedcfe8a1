//! Shopify Admin API access.
//!
//! Every call is made on behalf of one shop, with the offline access token
//! stored for it in the session table. Credentials are passed per call, so a
//! single [`AdminClient`] serves any number of shops.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_bridge_api::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify, config.upstream_timeout)?;
//! let order = client.get_order(&credentials, &order_id).await?;
//! ```

mod client;
mod customers;
mod orders;
pub mod queries;
mod returns;
pub mod types;
pub mod webhook;

pub use client::AdminClient;
pub use orders::CustomerOrdersSource;
pub use types::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with an unexpected HTTP status.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A mutation rejected its input.
    #[error("User errors: {}", format_user_errors(.0))]
    UserErrors(Vec<UserError>),
}

impl ShopifyError {
    /// Errors worth showing to the caller verbatim, if this is an upstream
    /// rejection rather than a transport failure.
    #[must_use]
    pub fn details(&self) -> Option<Vec<UserError>> {
        match self {
            Self::GraphQL(errors) => Some(errors.iter().map(UserError::from).collect()),
            Self::UserErrors(errors) => Some(errors.clone()),
            _ => None,
        }
    }

    /// Whether the request gave up waiting on Shopify.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
    /// `extensions.code`, e.g. `THROTTLED` or `ACCESS_DENIED`.
    pub code: Option<String>,
}

/// An input error reported by a mutation (`userErrors` and friends).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Human-readable message.
    pub message: String,
    /// Path to the offending input field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Vec<String>>,
    /// Machine-readable error code, when the mutation provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<&GraphQLError> for UserError {
    fn from(error: &GraphQLError) -> Self {
        let field = (!error.path.is_empty()).then(|| {
            error
                .path
                .iter()
                .map(|segment| match segment {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        });
        Self {
            message: error.message.clone(),
            field,
            code: error.code.clone(),
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
