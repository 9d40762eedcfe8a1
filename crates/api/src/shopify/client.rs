//! Shopify Admin API GraphQL client.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::{Deserialize, de::DeserializeOwned};
use shop_bridge_core::ShopDomain;
use tracing::instrument;

use super::{GraphQLError, ShopifyError};
use crate::config::ShopifyConfig;
use crate::models::ShopCredentials;

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    api_version: String,
    base_url: Option<String>,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    path: Vec<serde_json::Value>,
    #[serde(default)]
    extensions: Option<GraphQLErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorExtensions {
    code: Option<String>,
}

impl From<GraphQLErrorResponse> for GraphQLError {
    fn from(e: GraphQLErrorResponse) -> Self {
        Self {
            message: e.message,
            path: e.path,
            code: e.extensions.and_then(|ext| ext.code),
        }
    }
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// `timeout` bounds each HTTP request.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyConfig, timeout: Duration) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shop-bridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                api_version: config.api_version.clone(),
                base_url: config.admin_base_url.clone(),
            }),
        })
    }

    /// GraphQL endpoint for a shop.
    #[must_use]
    pub fn endpoint(&self, shop: &ShopDomain) -> String {
        let origin = self
            .inner
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{shop}"));
        format!("{origin}/admin/api/{}/graphql.json", self.inner.api_version)
    }

    /// Execute a GraphQL operation for a shop and deserialize `data` into `T`.
    #[instrument(skip(self, credentials, query, variables), fields(shop = %credentials.shop))]
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        credentials: &ShopCredentials,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .inner
            .client
            .post(self.endpoint(&credentials.shop))
            .header("X-Shopify-Access-Token", credentials.access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                // Shopify sends fractional seconds ("2.0")
                .and_then(|s| s.trim().split('.').next()?.parse::<u64>().ok())
                .unwrap_or(60);
            tracing::warn!(retry_after, "Shopify rate limit hit");
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        if !response.status().is_success() {
            return Err(ShopifyError::Status(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        let graphql_response: GraphQLResponse<T> = serde_json::from_slice(&bytes)?;

        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(GraphQLError::from).collect(),
            ));
        }

        graphql_response.data.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                path: vec![],
                code: None,
            }])
        })
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("api_version", &self.inner.api_version)
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}
