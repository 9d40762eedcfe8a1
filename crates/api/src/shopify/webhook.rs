//! Shopify webhook verification and payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

/// Header carrying the base64 HMAC of the raw body.
pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";

/// Header naming the shop a webhook is about.
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

/// Header naming the webhook topic.
pub const TOPIC_HEADER: &str = "x-shopify-topic";

/// Why a webhook was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// No signature header was sent.
    #[error("missing webhook signature")]
    MissingSignature,
    /// The signature is not valid base64.
    #[error("malformed webhook signature")]
    MalformedSignature,
    /// The signature does not match the body.
    #[error("webhook signature mismatch")]
    SignatureMismatch,
}

/// Verify that `body` was signed by Shopify with the app secret.
///
/// The comparison runs in constant time.
///
/// # Errors
///
/// Returns a [`WebhookError`] describing why the signature was rejected.
pub fn verify_hmac(
    secret: &SecretString,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), WebhookError> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(WebhookError::MissingSignature)?;
    let expected = STANDARD
        .decode(signature)
        .map_err(|_| WebhookError::MalformedSignature)?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| WebhookError::SignatureMismatch)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| WebhookError::SignatureMismatch)
}

/// Payload of the `app/scopes_update` webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct ScopesUpdatePayload {
    /// Scopes granted now.
    #[serde(default)]
    pub current: Vec<String>,
    /// Scopes granted before the update.
    #[serde(default)]
    pub previous: Vec<String>,
}

#[cfg(test)]
pub(crate) fn sign(secret: &str, body: &[u8]) -> String {
    #[allow(clippy::unwrap_used)]
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}
