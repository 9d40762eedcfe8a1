//! Customer operations for the Admin API.

use serde::Deserialize;
use shop_bridge_core::CustomerGid;
use tracing::instrument;

use super::{
    AdminClient, ShopifyError, UserError,
    queries::{CUSTOMER_CREATE, CUSTOMER_DELETE, CUSTOMER_REQUEST_DATA_ERASURE},
    types::{CreatedCustomer, CustomerInput, MutationPayload},
};
use crate::models::ShopCredentials;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerCreateData {
    customer_create: Option<MutationPayload<CustomerCreateResult>>,
}

#[derive(Debug, Deserialize)]
struct CustomerCreateResult {
    customer: Option<CreatedCustomer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerDeleteData {
    customer_delete: Option<MutationPayload<CustomerDeleteResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerDeleteResult {
    deleted_customer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataErasureData {
    customer_request_data_erasure: Option<MutationPayload<DataErasureResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataErasureResult {
    customer_id: Option<String>,
}

/// Turn a mutation payload into its result, or the user errors it carries.
///
/// A payload with no errors but no result is reported with `fallback`.
fn into_result<T, R>(
    payload: Option<MutationPayload<T>>,
    pick: impl FnOnce(T) -> Option<R>,
    fallback: &str,
) -> Result<R, ShopifyError> {
    let payload = payload.ok_or_else(|| user_error(fallback))?;
    if !payload.user_errors.is_empty() {
        return Err(ShopifyError::UserErrors(payload.user_errors));
    }
    pick(payload.result).ok_or_else(|| user_error(fallback))
}

fn user_error(message: &str) -> ShopifyError {
    ShopifyError::UserErrors(vec![UserError {
        message: message.to_string(),
        field: None,
        code: None,
    }])
}

impl AdminClient {
    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserErrors` if Shopify rejects the input
    /// (e.g. the email is already taken).
    #[instrument(skip(self, credentials, input), fields(email_domain = %input.email.domain()))]
    pub async fn create_customer(
        &self,
        credentials: &ShopCredentials,
        input: &CustomerInput,
    ) -> Result<CreatedCustomer, ShopifyError> {
        let variables = serde_json::json!({ "input": input });
        let data: CustomerCreateData = self.execute(credentials, CUSTOMER_CREATE, variables).await?;

        let customer = into_result(
            data.customer_create,
            |r| r.customer,
            "Customer could not be created",
        )?;
        tracing::info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Permanently delete a customer.
    ///
    /// Shopify refuses this for customers with orders; use
    /// [`AdminClient::request_customer_data_erasure`] for those.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserErrors` if the customer could not be deleted.
    #[instrument(skip(self, credentials), fields(customer_id = %id))]
    pub async fn delete_customer(
        &self,
        credentials: &ShopCredentials,
        id: &CustomerGid,
    ) -> Result<String, ShopifyError> {
        let variables = serde_json::json!({ "id": id });
        let data: CustomerDeleteData = self.execute(credentials, CUSTOMER_DELETE, variables).await?;

        let deleted = into_result(
            data.customer_delete,
            |r| r.deleted_customer_id,
            "Customer could not be deleted",
        )?;
        tracing::info!("Customer deleted");
        Ok(deleted)
    }

    /// Ask Shopify to erase a customer's personal data.
    ///
    /// Shopify carries the erasure out later; for customers with orders
    /// that is after its retention period.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserErrors` if the request is refused.
    #[instrument(skip(self, credentials), fields(customer_id = %id))]
    pub async fn request_customer_data_erasure(
        &self,
        credentials: &ShopCredentials,
        id: &CustomerGid,
    ) -> Result<String, ShopifyError> {
        let variables = serde_json::json!({ "customerId": id });
        let data: DataErasureData = self
            .execute(credentials, CUSTOMER_REQUEST_DATA_ERASURE, variables)
            .await?;

        let customer_id = into_result(
            data.customer_request_data_erasure,
            |r| r.customer_id,
            "Customer data erasure failed",
        )?;
        tracing::info!("Customer data erasure requested");
        Ok(customer_id)
    }
}
