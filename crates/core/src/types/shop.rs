//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Suffix every Shopify admin domain ends with.
const MYSHOPIFY_SUFFIX: &str = ".myshopify.com";

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input is not a `*.myshopify.com` domain.
    #[error("shop domain must end with {MYSHOPIFY_SUFFIX}")]
    NotMyshopify,
    /// The store handle contains characters Shopify does not allow.
    #[error("shop domain contains invalid characters")]
    InvalidCharacters,
}

/// A `*.myshopify.com` shop domain.
///
/// Used to look up the stored session for a shop and to build the Admin API
/// endpoint. Input is lowercased, and a leading `https://` or trailing `/` is
/// stripped, so values copied from a browser address bar are accepted.
///
/// ## Examples
///
/// ```
/// use shop_bridge_core::ShopDomain;
///
/// let shop = ShopDomain::parse("https://My-Store.myshopify.com/").unwrap();
/// assert_eq!(shop.as_str(), "my-store.myshopify.com");
///
/// assert!(ShopDomain::parse("example.com").is_err());
/// assert!(ShopDomain::parse(".myshopify.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not a `myshopify.com` domain,
    /// or has a store handle with characters other than `a-z`, `0-9` and `-`.
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let lowered = s.trim().to_ascii_lowercase();
        let trimmed = lowered
            .strip_prefix("https://")
            .unwrap_or(&lowered)
            .trim_end_matches('/');

        if trimmed.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        let handle = trimmed
            .strip_suffix(MYSHOPIFY_SUFFIX)
            .ok_or(ShopDomainError::NotMyshopify)?;

        if handle.is_empty()
            || handle.starts_with('-')
            || !handle
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(ShopDomainError::InvalidCharacters);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the store handle (the part before `.myshopify.com`).
    #[must_use]
    pub fn handle(&self) -> &str {
        self.0.strip_suffix(MYSHOPIFY_SUFFIX).unwrap_or(&self.0)
    }

    /// Id of the offline session Shopify's session storage uses for this shop.
    #[must_use]
    pub fn offline_session_id(&self) -> String {
        format!("offline_{}", self.0)
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopDomain> for String {
    fn from(shop: ShopDomain) -> Self {
        shop.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
