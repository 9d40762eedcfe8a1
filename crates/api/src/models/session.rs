//! Shopify app sessions.
//!
//! A session is created when a merchant installs the app. The offline session
//! of a shop carries the Admin API token used for every upstream call.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use shop_bridge_core::ShopDomain;

/// A stored Shopify session.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopSession {
    /// Session id, `offline_{shop}` for offline sessions.
    pub id: String,
    /// Shop the session belongs to.
    pub shop: ShopDomain,
    /// OAuth state from the install flow.
    pub state: String,
    /// Online sessions belong to a staff member and expire.
    pub is_online: bool,
    /// Granted scopes.
    pub scopes: Vec<String>,
    /// When an online session expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Admin API access token (redacted in debug output).
    pub access_token: SecretString,
    /// When the session was first stored.
    pub created_at: DateTime<Utc>,
    /// When the session was last written.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for ShopSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopSession")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("is_online", &self.is_online)
            .field("scopes", &self.scopes)
            .field("expires_at", &self.expires_at)
            .field("access_token", &"[REDACTED]")
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

impl ShopSession {
    /// Credentials for calling the Admin API with this session.
    #[must_use]
    pub fn credentials(&self) -> ShopCredentials {
        ShopCredentials {
            shop: self.shop.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

/// What the Admin API client needs to act for a shop.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopCredentials {
    /// Shop to call.
    pub shop: ShopDomain,
    /// Admin API access token.
    pub access_token: SecretString,
}

impl ShopCredentials {
    /// Create credentials from a shop and token.
    #[must_use]
    pub fn new(shop: ShopDomain, access_token: impl Into<String>) -> Self {
        Self {
            shop,
            access_token: SecretString::from(access_token.into()),
        }
    }
}

impl std::fmt::Debug for ShopCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopCredentials")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Split a comma-separated scope string as Shopify stores it.
#[must_use]
pub fn parse_scopes(scope: Option<&str>) -> Vec<String> {
    scope
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scopes() {
        assert_eq!(
            parse_scopes(Some("read_orders, write_orders,,read_customers")),
            vec!["read_orders", "write_orders", "read_customers"]
        );
        assert!(parse_scopes(None).is_empty());
        assert!(parse_scopes(Some("")).is_empty());
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let creds = ShopCredentials::new(
            ShopDomain::parse("acme.myshopify.com").unwrap(),
            "shpat_abc123",
        );
        let debug = format!("{creds:?}");
        assert!(debug.contains("acme.myshopify.com"));
        assert!(!debug.contains("shpat_abc123"));
    }
}
