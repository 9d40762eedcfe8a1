//! Shopify global IDs (GIDs) for type-safe resource references.
//!
//! Storefront clients send either a bare numeric id (`"123"`) or a full GID
//! (`"gid://shopify/Customer/123"`). The types defined here accept both and
//! always hold the full GID, so the Admin API never sees a bare number.
//!
//! Use the `define_gid!` macro to create a wrapper for a resource type.

use thiserror::Error;

/// Prefix shared by every Shopify GID.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Errors that can occur when parsing a GID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GidError {
    /// The input string is empty.
    #[error("id cannot be empty")]
    Empty,
    /// The GID names a different resource type.
    #[error("expected a {expected} id, got a {found} id")]
    WrongResource {
        /// Resource type the caller asked for.
        expected: &'static str,
        /// Resource type found in the input.
        found: String,
    },
    /// The input is neither a numeric id nor a well-formed GID.
    #[error("malformed id: {0}")]
    Malformed(String),
}

/// Parse `input` as a GID for `resource`, promoting bare numeric ids.
///
/// # Errors
///
/// Returns an error if the input is empty, malformed, or names another resource.
pub fn normalize_gid(resource: &'static str, input: &str) -> Result<String, GidError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(GidError::Empty);
    }

    if let Some(rest) = input.strip_prefix(GID_PREFIX) {
        let (found, id) = rest
            .split_once('/')
            .ok_or_else(|| GidError::Malformed(input.to_string()))?;
        if found != resource {
            return Err(GidError::WrongResource {
                expected: resource,
                found: found.to_string(),
            });
        }
        // Shopify may append query parameters to a GID (`.../123?key=value`)
        let numeric = id.split('?').next().unwrap_or_default();
        if numeric.is_empty() || !numeric.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GidError::Malformed(input.to_string()));
        }
        return Ok(input.to_string());
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(format!("{GID_PREFIX}{resource}/{input}"));
    }

    Err(GidError::Malformed(input.to_string()))
}

/// Macro to define a GID wrapper for one Shopify resource type.
///
/// Creates a newtype around `String` with:
/// - `Serialize`/`Deserialize` (deserialization validates and normalizes)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Display`
/// - `parse()`, `as_str()`, `numeric_id()`
///
/// # Example
///
/// ```rust
/// # use shop_bridge_core::define_gid;
/// define_gid!(ProductGid, "Product");
///
/// let id = ProductGid::parse("42").unwrap();
/// assert_eq!(id.as_str(), "gid://shopify/Product/42");
/// assert_eq!(id.numeric_id(), "42");
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Shopify resource type this id refers to.
            pub const RESOURCE: &'static str = $resource;

            /// Parse a numeric id or a full GID.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is empty, malformed, or a GID
            /// for another resource type.
            pub fn parse(input: &str) -> ::core::result::Result<Self, $crate::types::gid::GidError> {
                $crate::types::gid::normalize_gid($resource, input).map(Self)
            }

            /// The full GID.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The numeric part of the GID.
            #[must_use]
            pub fn numeric_id(&self) -> &str {
                let tail = self.0.rsplit('/').next().unwrap_or_default();
                tail.split('?').next().unwrap_or_default()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::gid::GidError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::types::gid::GidError;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_gid!(CustomerGid, "Customer");
define_gid!(OrderGid, "Order");
define_gid!(FulfillmentLineItemGid, "FulfillmentLineItem");
