//! Order operations for the Admin API.

use serde::Deserialize;
use shop_bridge_core::{Continuation, OrderGid, Page, PageRequest, PageSource};
use tracing::instrument;

use super::{
    AdminClient, ShopifyError,
    queries::{GET_CUSTOMER_ORDERS, GET_ORDER, ORDER_CANCEL},
    types::{Connection, Job, MutationPayload, Order, OrderCancellation},
};
use crate::models::ShopCredentials;

#[derive(Debug, Deserialize)]
struct CustomerOrdersData {
    customer: Option<CustomerOrders>,
}

#[derive(Debug, Deserialize)]
struct CustomerOrders {
    orders: Connection<Order>,
}

#[derive(Debug, Deserialize)]
struct OrderData {
    order: Option<Order>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderCancelData {
    order_cancel: Option<MutationPayload<OrderCancelResult>>,
}

#[derive(Debug, Deserialize)]
struct OrderCancelResult {
    job: Option<Job>,
}

/// Pages through one customer's orders.
///
/// The `resource_id` of each [`PageRequest`] is the customer GID.
pub struct CustomerOrdersSource<'a> {
    client: &'a AdminClient,
    credentials: &'a ShopCredentials,
}

impl<'a> CustomerOrdersSource<'a> {
    /// Create a source that calls the Admin API with `credentials`.
    #[must_use]
    pub const fn new(client: &'a AdminClient, credentials: &'a ShopCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

impl PageSource<Order> for CustomerOrdersSource<'_> {
    type Error = ShopifyError;

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<Order>, ShopifyError> {
        self.client
            .customer_orders_page(self.credentials, &request)
            .await
    }
}

impl AdminClient {
    /// Fetch one page of a customer's orders.
    ///
    /// An unknown customer yields an empty last page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(
        skip(self, credentials, request),
        fields(customer_id = %request.resource_id, has_cursor = request.cursor.is_some())
    )]
    pub async fn customer_orders_page(
        &self,
        credentials: &ShopCredentials,
        request: &PageRequest,
    ) -> Result<Page<Order>, ShopifyError> {
        let variables = serde_json::json!({
            "customerId": request.resource_id,
            "first": request.page_size,
            "cursor": request.cursor,
        });

        let data: CustomerOrdersData = self
            .execute(credentials, GET_CUSTOMER_ORDERS, variables)
            .await?;

        let Some(customer) = data.customer else {
            tracing::debug!("Customer not found, treating as no orders");
            return Ok(Page::last(Vec::new()));
        };

        let page_info = customer.orders.page_info.clone();
        let items = customer.orders.into_nodes();
        let continuation = page_info.map_or(Continuation::End, |info| {
            Continuation::from_page_info(info.has_next_page, info.end_cursor)
        });

        Ok(Page::new(items, continuation))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, credentials), fields(order_id = %id))]
    pub async fn get_order(
        &self,
        credentials: &ShopCredentials,
        id: &OrderGid,
    ) -> Result<Option<Order>, ShopifyError> {
        let variables = serde_json::json!({ "orderId": id });
        let data: OrderData = self.execute(credentials, GET_ORDER, variables).await?;
        Ok(data.order)
    }

    /// Cancel an order, refunding and restocking it and notifying the customer.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserErrors` if Shopify refuses the cancellation.
    #[instrument(skip(self, credentials, cancellation), fields(order_id = %cancellation.order_id, reason = %cancellation.reason))]
    pub async fn cancel_order(
        &self,
        credentials: &ShopCredentials,
        cancellation: &OrderCancellation,
    ) -> Result<Option<Job>, ShopifyError> {
        let variables = serde_json::json!({
            "orderId": cancellation.order_id,
            "refund": true,
            "restock": true,
            "reason": cancellation.reason,
            "notifyCustomer": true,
            "staffNote": cancellation.staff_note,
        });

        let data: OrderCancelData = self.execute(credentials, ORDER_CANCEL, variables).await?;
        let payload = data.order_cancel.ok_or_else(|| {
            ShopifyError::UserErrors(vec![super::UserError {
                message: "orderCancel returned no payload".to_string(),
                field: None,
                code: None,
            }])
        })?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserErrors(payload.user_errors));
        }

        tracing::info!("Order cancellation requested");
        Ok(payload.result.job)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use shop_bridge_core::{FetchOptions, Termination, fetch_all};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::client::tests::{TEST_PATH, test_client, test_credentials};
    use super::*;

    fn order_node(id: u32, created_at: &str) -> serde_json::Value {
        serde_json::json!({
            "node": {
                "id": format!("gid://shopify/Order/{id}"),
                "name": format!("#{id}"),
                "createdAt": created_at,
                "lineItems": {"edges": []}
            }
        })
    }

    fn orders_page(
        edges: Vec<serde_json::Value>,
        has_next_page: bool,
        end_cursor: Option<&str>,
    ) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "customer": {
                    "id": "gid://shopify/Customer/7",
                    "orders": {
                        "edges": edges,
                        "pageInfo": {"hasNextPage": has_next_page, "endCursor": end_cursor}
                    }
                }
            }
        }))
    }

    #[tokio::test]
    async fn test_fetch_all_customer_orders_across_pages() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TEST_PATH))
            .and(body_partial_json(serde_json::json!({
                "variables": {"customerId": "gid://shopify/Customer/7", "first": 2, "cursor": null}
            })))
            .respond_with(orders_page(
                vec![
                    order_node(1, "2024-01-01T00:00:00Z"),
                    order_node(2, "2024-03-01T00:00:00Z"),
                ],
                true,
                Some("cursor-1"),
            ))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(TEST_PATH))
            .and(body_partial_json(serde_json::json!({
                "variables": {"cursor": "cursor-1"}
            })))
            .respond_with(orders_page(
                vec![order_node(3, "2024-02-01T00:00:00Z")],
                false,
                None,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let credentials = test_credentials();
        let source = CustomerOrdersSource::new(&client, &credentials);
        let options = FetchOptions {
            page_size: 2,
            max_pages: 10,
        };

        let collected = fetch_all(&source, "gid://shopify/Customer/7", options)
            .await
            .unwrap();

        assert_eq!(collected.total_count, 3);
        assert_eq!(collected.pages_fetched, 2);
        assert_eq!(collected.termination, Termination::Exhausted);
        let names: Vec<_> = collected.items.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["#2", "#3", "#1"]);
        assert_eq!(
            collected.items[0].created_at.instant(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_unknown_customer_has_no_orders() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"customer": null}})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let credentials = test_credentials();
        let source = CustomerOrdersSource::new(&client, &credentials);

        let collected = fetch_all(&source, "gid://shopify/Customer/404", FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(collected.total_count, 0);
        assert!(collected.items.is_empty());
    }

    #[tokio::test]
    async fn test_graphql_error_on_later_page_aborts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"variables": {"cursor": null}})))
            .respond_with(orders_page(
                vec![order_node(1, "2024-01-01T00:00:00Z")],
                true,
                Some("cursor-1"),
            ))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"variables": {"cursor": "cursor-1"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errors": [{"message": "Throttled", "extensions": {"code": "THROTTLED"}}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let credentials = test_credentials();
        let source = CustomerOrdersSource::new(&client, &credentials);

        let err = fetch_all(&source, "gid://shopify/Customer/7", FetchOptions::default())
            .await
            .unwrap_err();
        match err {
            shop_bridge_core::PaginationError::Source { page, source } => {
                assert_eq!(page, 2);
                assert!(matches!(source, ShopifyError::GraphQL(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_cursor_stops_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(orders_page(
                vec![order_node(1, "2024-01-01T00:00:00Z")],
                true,
                None,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let credentials = test_credentials();
        let source = CustomerOrdersSource::new(&client, &credentials);

        let collected = fetch_all(&source, "gid://shopify/Customer/7", FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(collected.termination, Termination::MissingCursor);
        assert_eq!(collected.total_count, 1);
    }

    #[tokio::test]
    async fn test_get_order_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "variables": {"orderId": "gid://shopify/Order/99"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {"order": null}})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let order = client
            .get_order(&test_credentials(), &OrderGid::parse("99").unwrap())
            .await
            .unwrap();
        assert!(order.is_none());
    }

    #[tokio::test]
    async fn test_cancel_order_sends_fixed_flags() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "variables": {
                    "orderId": "gid://shopify/Order/5",
                    "refund": true,
                    "restock": true,
                    "notifyCustomer": true,
                    "reason": "CUSTOMER",
                    "staffNote": "Ordered by mistake"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "orderCancel": {
                        "job": {"id": "gid://shopify/Job/1", "done": false},
                        "orderCancelUserErrors": []
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let cancellation = OrderCancellation::from_request(
            OrderGid::parse("5").unwrap(),
            Some("Ordered by mistake"),
            None,
        );
        let job = client
            .cancel_order(&test_credentials(), &cancellation)
            .await
            .unwrap();
        assert_eq!(
            job,
            Some(Job {
                id: "gid://shopify/Job/1".to_string(),
                done: false
            })
        );
    }

    #[tokio::test]
    async fn test_cancel_order_user_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "orderCancel": {
                        "job": null,
                        "orderCancelUserErrors": [{
                            "field": ["orderId"],
                            "message": "Order has already been cancelled",
                            "code": "INVALID"
                        }]
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let cancellation =
            OrderCancellation::from_request(OrderGid::parse("5").unwrap(), None, None);
        let err = client
            .cancel_order(&test_credentials(), &cancellation)
            .await
            .unwrap_err();

        let details = err.details().unwrap();
        assert_eq!(details[0].message, "Order has already been cancelled");
        assert_eq!(details[0].code.as_deref(), Some("INVALID"));
    }
}
