//! Request and response shapes for the Admin API operations used here.
//!
//! Only the fields this service reads are typed. Everything else Shopify
//! returns for an order is kept as JSON and handed back to the caller as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_bridge_core::{
    CancelReason, CustomerGid, Email, FulfillmentLineItemGid, OrderGid, ReturnReason, Timestamped,
};

use super::UserError;

// =============================================================================
// Connections
// =============================================================================

/// A Relay-style connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    /// Edges of this page.
    pub edges: Vec<Edge<T>>,
    /// Pagination info, when selected.
    pub page_info: Option<PageInfo>,
}

impl<T> Connection<T> {
    /// The nodes of this page, in order.
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|edge| edge.node).collect()
    }
}

/// A connection edge.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    /// The item.
    pub node: T,
}

/// Relay pagination info.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether another page follows.
    pub has_next_page: bool,
    /// Cursor of the last edge.
    pub end_cursor: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// An order as returned by the order queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order GID.
    pub id: String,
    /// Display name, e.g. `#1001`.
    pub name: String,
    /// When the order was placed.
    pub created_at: Timestamp,
    /// Remaining selected fields, passed through untouched.
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl Timestamped for Order {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at.instant()
    }
}

/// A Shopify `DateTime` scalar.
///
/// Serializes back exactly as Shopify sent it; the parsed instant is only
/// used for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp {
    raw: String,
    instant: DateTime<Utc>,
}

impl Timestamp {
    /// The value as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The value as a UTC instant.
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl TryFrom<String> for Timestamp {
    type Error = chrono::ParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let instant = DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc);
        Ok(Self { raw, instant })
    }
}

impl From<Timestamp> for String {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.raw
    }
}

/// Arguments of an `orderCancel` call.
///
/// The order is always refunded, restocked and the customer notified.
#[derive(Debug, Clone)]
pub struct OrderCancellation {
    /// Order to cancel.
    pub order_id: OrderGid,
    /// Shopify cancel reason.
    pub reason: CancelReason,
    /// Note visible to staff.
    pub staff_note: Option<String>,
}

impl OrderCancellation {
    /// Build a cancellation from the caller's free-text reason.
    ///
    /// The raw reason doubles as the staff note, so staff see what the
    /// customer picked; an explicit `staff_note` is only used without one.
    #[must_use]
    pub fn from_request(
        order_id: OrderGid,
        reason: Option<&str>,
        staff_note: Option<&str>,
    ) -> Self {
        let reason_text = reason.map(str::trim).filter(|r| !r.is_empty());
        let staff_note = reason_text
            .or_else(|| staff_note.map(str::trim).filter(|n| !n.is_empty()))
            .map(String::from);

        Self {
            order_id,
            reason: CancelReason::normalize(reason),
            staff_note,
        }
    }
}

/// A background job started by Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job GID.
    pub id: String,
    /// Whether the job already finished.
    pub done: bool,
}

// =============================================================================
// Returns
// =============================================================================

/// One line of a return request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLineItemInput {
    /// Fulfilled line being returned.
    pub fulfillment_line_item_id: FulfillmentLineItemGid,
    /// Units returned.
    pub quantity: u32,
    /// Shopify return reason.
    pub return_reason: ReturnReason,
}

// =============================================================================
// Customers
// =============================================================================

/// Input for `customerCreate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: Email,
    /// Phone number in E.164 format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CustomerInput {
    /// Trim names and phone, and check what Shopify would reject anyway.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn validate(mut self) -> Result<Self, String> {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        if self.first_name.is_empty() {
            return Err("firstName is required".to_string());
        }
        if self.last_name.is_empty() {
            return Err("lastName is required".to_string());
        }

        self.phone = self
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        if let Some(phone) = &self.phone
            && !is_e164(phone)
        {
            return Err("phone must be in E.164 format, e.g. +14155550123".to_string());
        }

        Ok(self)
    }
}

fn is_e164(phone: &str) -> bool {
    phone.strip_prefix('+').is_some_and(|digits| {
        (7..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
    })
}

/// A customer returned by `customerCreate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCustomer {
    /// Customer GID.
    pub id: CustomerGid,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Primary email.
    pub default_email_address: Option<EmailAddress>,
    /// Primary phone.
    pub default_phone_number: Option<PhoneNumber>,
}

/// A customer email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    /// The address.
    pub email_address: String,
}

/// A customer phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    /// The number.
    pub phone_number: String,
}

/// Payload shared by mutations that report `userErrors`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MutationPayload<T> {
    #[serde(flatten)]
    pub(crate) result: T,
    #[serde(default, alias = "orderCancelUserErrors")]
    pub(crate) user_errors: Vec<UserError>,
}
