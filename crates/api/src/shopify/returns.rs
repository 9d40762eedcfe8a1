//! Return operations for the Admin API.

use serde::Deserialize;
use shop_bridge_core::OrderGid;
use tracing::instrument;

use super::{
    AdminClient, ShopifyError,
    queries::{GET_RETURNABLE_FULFILLMENTS, RETURN_CREATE},
    types::{MutationPayload, ReturnLineItemInput},
};
use crate::models::ShopCredentials;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReturnableFulfillmentsData {
    returnable_fulfillments: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReturnCreateData {
    return_create: Option<MutationPayload<ReturnCreateResult>>,
}

#[derive(Debug, Deserialize)]
struct ReturnCreateResult {
    #[serde(rename = "return")]
    created: Option<serde_json::Value>,
}

impl AdminClient {
    /// List the fulfilled lines of an order that can still be returned.
    ///
    /// Returns the `returnableFulfillments` connection as Shopify sends it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, credentials), fields(order_id = %order_id))]
    pub async fn get_returnable_fulfillments(
        &self,
        credentials: &ShopCredentials,
        order_id: &OrderGid,
    ) -> Result<Option<serde_json::Value>, ShopifyError> {
        let variables = serde_json::json!({ "orderId": order_id });
        let data: ReturnableFulfillmentsData = self
            .execute(credentials, GET_RETURNABLE_FULFILLMENTS, variables)
            .await?;
        Ok(data.returnable_fulfillments)
    }

    /// Open a return for some fulfilled lines of an order.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserErrors` if Shopify refuses the return.
    #[instrument(skip(self, credentials, items), fields(order_id = %order_id, lines = items.len()))]
    pub async fn create_return(
        &self,
        credentials: &ShopCredentials,
        order_id: &OrderGid,
        items: &[ReturnLineItemInput],
    ) -> Result<Option<serde_json::Value>, ShopifyError> {
        let variables = serde_json::json!({
            "returnInput": {
                "orderId": order_id,
                "returnLineItems": items,
            }
        });

        let data: ReturnCreateData = self.execute(credentials, RETURN_CREATE, variables).await?;
        let Some(payload) = data.return_create else {
            return Ok(None);
        };

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserErrors(payload.user_errors));
        }

        tracing::info!("Return created");
        Ok(payload.result.created)
    }
}
