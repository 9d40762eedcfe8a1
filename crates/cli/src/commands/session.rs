//! Offline session management.
//!
//! Sessions are normally written by the app install flow. These commands
//! bootstrap a shop by hand (e.g. with a custom-app token) and inspect what
//! is stored.
//!
//! # Usage
//!
//! ```bash
//! sb-cli session upsert --shop acme.myshopify.com --token shpat_... \
//!     --scopes read_orders,write_orders,read_customers,write_customers
//! sb-cli session show --shop acme.myshopify.com
//! sb-cli session delete --shop acme.myshopify.com
//! ```

use secrecy::SecretString;
use shop_bridge_api::db::{NewSession, ShopSessionRepository};
use shop_bridge_api::models::parse_scopes;
use shop_bridge_core::ShopDomain;

use super::{CommandError, connect};

/// Prefixes of Shopify Admin API access tokens.
const TOKEN_PREFIXES: &[&str] = &["shpat_", "shpca_", "shpua_"];

/// Check that `token` looks like an Admin API access token.
fn validate_token(token: &str) -> Result<(), CommandError> {
    if TOKEN_PREFIXES.iter().any(|p| token.starts_with(p)) && token.len() > 16 {
        Ok(())
    } else {
        Err(CommandError::InvalidArgument(
            "token must be a Shopify Admin API access token (shpat_...)".to_string(),
        ))
    }
}

/// Store the offline session of a shop, replacing any existing one.
///
/// # Errors
///
/// Returns an error for an invalid shop or token, or if the write fails.
pub async fn upsert(shop: &str, token: &str, scopes: Option<&str>) -> Result<(), CommandError> {
    let shop = ShopDomain::parse(shop)?;
    let token = token.trim();
    validate_token(token)?;

    let session = NewSession::offline(
        shop.clone(),
        SecretString::from(token),
        parse_scopes(scopes),
    );

    let pool = connect().await?;
    ShopSessionRepository::new(&pool).upsert(&session).await?;

    tracing::info!(shop = %shop, id = %session.id, "Offline session stored");
    Ok(())
}

/// Print the offline session of a shop, without its token.
///
/// # Errors
///
/// Returns an error if the shop has no offline session.
pub async fn show(shop: &str) -> Result<(), CommandError> {
    let shop = ShopDomain::parse(shop)?;

    let pool = connect().await?;
    let session = ShopSessionRepository::new(&pool)
        .get_offline_by_shop(&shop)
        .await?
        .ok_or_else(|| CommandError::NotFound(format!("No offline session for {shop}")))?;

    #[allow(clippy::print_stdout)]
    {
        println!("id:         {}", session.id);
        println!("shop:       {}", session.shop);
        println!("scopes:     {}", session.scopes.join(","));
        println!("updated_at: {}", session.updated_at);
    }
    Ok(())
}

/// Delete every session of a shop.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete(shop: &str) -> Result<(), CommandError> {
    let shop = ShopDomain::parse(shop)?;

    let pool = connect().await?;
    let deleted = ShopSessionRepository::new(&pool).delete_by_shop(&shop).await?;

    tracing::info!(shop = %shop, sessions = deleted, "Sessions deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_token() {
        assert!(validate_token("shpat_1a2b3c4d5e6f7a8b9c0d").is_ok());
        assert!(validate_token("shpat_").is_err());
        assert!(validate_token("sk_live_1a2b3c4d5e6f7a8b9c0d").is_err());
    }
}
