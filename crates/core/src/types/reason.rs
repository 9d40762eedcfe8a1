//! Free-text reason normalizers for order cancellations and returns.
//!
//! Storefront clients send whatever label their UI showed the customer
//! ("Found a better price", "Size too small", ...). Shopify only accepts a
//! closed set of enum values, so each label is mapped through a fixed phrase
//! table. Lookup is case-insensitive, ignores surrounding whitespace, and
//! falls back to `OTHER` for anything it does not recognize.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reason sent with Shopify's `orderCancel` mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    /// The customer asked for the cancellation.
    Customer,
    /// Payment was declined.
    Declined,
    /// The order was fraudulent.
    Fraud,
    /// Items were out of stock.
    Inventory,
    /// A staff member made an error.
    Staff,
    /// Anything else.
    Other,
}

const CANCEL_PHRASES: &[(&str, CancelReason)] = &[
    ("ordered by mistake", CancelReason::Customer),
    ("found a better price", CancelReason::Customer),
    ("change in delivery date", CancelReason::Customer),
    ("item no longer needed", CancelReason::Customer),
    ("wrong shipping address", CancelReason::Customer),
    ("customer", CancelReason::Customer),
    ("declined", CancelReason::Declined),
    ("payment declined", CancelReason::Declined),
    ("fraud", CancelReason::Fraud),
    ("fraudulent", CancelReason::Fraud),
    ("inventory", CancelReason::Inventory),
    ("out of stock", CancelReason::Inventory),
    ("staff", CancelReason::Staff),
    ("staff error", CancelReason::Staff),
    ("other (custom)", CancelReason::Other),
];

impl CancelReason {
    /// Map a free-text cancellation reason to a Shopify reason.
    ///
    /// ```
    /// use shop_bridge_core::CancelReason;
    ///
    /// assert_eq!(CancelReason::normalize(Some("Found a better price")), CancelReason::Customer);
    /// assert_eq!(CancelReason::normalize(Some("asdf unknown")), CancelReason::Other);
    /// assert_eq!(CancelReason::normalize(None), CancelReason::Other);
    /// ```
    #[must_use]
    pub fn normalize(input: Option<&str>) -> Self {
        lookup(CANCEL_PHRASES, input).unwrap_or(Self::Other)
    }

    /// The value Shopify expects in GraphQL variables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Declined => "DECLINED",
            Self::Fraud => "FRAUD",
            Self::Inventory => "INVENTORY",
            Self::Staff => "STAFF",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason attached to each line of Shopify's `returnCreate` mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnReason {
    /// Item arrived damaged or does not work.
    Defective,
    /// A different item was shipped.
    WrongItem,
    /// Item does not match its listing.
    NotAsDescribed,
    /// Customer no longer wants the item.
    Unwanted,
    /// Item is too small.
    SizeTooSmall,
    /// Item is too large.
    SizeTooLarge,
    /// Anything else, including late deliveries.
    Other,
}

const RETURN_PHRASES: &[(&str, ReturnReason)] = &[
    ("item damaged/defective", ReturnReason::Defective),
    ("damaged", ReturnReason::Defective),
    ("defective", ReturnReason::Defective),
    ("broken", ReturnReason::Defective),
    ("wrong item received", ReturnReason::WrongItem),
    ("wrong item", ReturnReason::WrongItem),
    ("incorrect item", ReturnReason::WrongItem),
    ("quality not as expected", ReturnReason::NotAsDescribed),
    ("not as described", ReturnReason::NotAsDescribed),
    ("different than expected", ReturnReason::NotAsDescribed),
    // Shopify has no late-delivery reason
    ("arrived too late", ReturnReason::Other),
    ("late delivery", ReturnReason::Other),
    ("arrived late", ReturnReason::Other),
    ("ordered by mistake", ReturnReason::Unwanted),
    ("unwanted", ReturnReason::Unwanted),
    ("changed mind", ReturnReason::Unwanted),
    ("no longer needed", ReturnReason::Unwanted),
    ("size too small", ReturnReason::SizeTooSmall),
    ("size too large", ReturnReason::SizeTooLarge),
];

impl ReturnReason {
    /// Map a free-text return reason to a Shopify return reason.
    ///
    /// ```
    /// use shop_bridge_core::ReturnReason;
    ///
    /// assert_eq!(ReturnReason::normalize(Some("Damaged")), ReturnReason::Defective);
    /// assert_eq!(ReturnReason::normalize(Some("Size too small")), ReturnReason::SizeTooSmall);
    /// assert_eq!(ReturnReason::normalize(Some("meh")), ReturnReason::Other);
    /// ```
    #[must_use]
    pub fn normalize(input: Option<&str>) -> Self {
        lookup(RETURN_PHRASES, input).unwrap_or(Self::Other)
    }

    /// The value Shopify expects in GraphQL variables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Defective => "DEFECTIVE",
            Self::WrongItem => "WRONG_ITEM",
            Self::NotAsDescribed => "NOT_AS_DESCRIBED",
            Self::Unwanted => "UNWANTED",
            Self::SizeTooSmall => "SIZE_TOO_SMALL",
            Self::SizeTooLarge => "SIZE_TOO_LARGE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for ReturnReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lookup<R: Copy>(table: &[(&str, R)], input: Option<&str>) -> Option<R> {
    let needle = input?.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    table
        .iter()
        .find(|(phrase, _)| *phrase == needle)
        .map(|(_, reason)| *reason)
}
