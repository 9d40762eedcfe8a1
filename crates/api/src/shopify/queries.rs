//! GraphQL documents sent to the Admin API.
//!
//! Orders are selected through one shared fragment so the order list and the
//! single-order lookup return the same shape.

macro_rules! order_fields_fragment {
    () => {
        r"
fragment OrderFields on Order {
  id
  name
  createdAt
  cancelReason
  cancelledAt
  number
  returnStatus
  subtotalPriceSet { presentmentMoney { amount currencyCode } }
  totalPriceSet { presentmentMoney { amount currencyCode } }
  taxesIncluded
  totalTaxSet { presentmentMoney { amount currencyCode } }
  cancellation { staffNote }
  lineItems(first: 250) {
    edges {
      node {
        currentQuantity
        image { url }
        name
        sku
        title
        vendor
        variantTitle
        originalUnitPriceSet { presentmentMoney { amount currencyCode } }
      }
    }
  }
  returns(first: 10) {
    edges {
      node {
        id
        name
        status
        createdAt
        closedAt
        returnLineItems(first: 10) {
          edges {
            node {
              ... on ReturnLineItem {
                quantity
                returnReason
                returnReasonNote
                fulfillmentLineItem { lineItem { name } }
              }
            }
          }
        }
      }
    }
  }
  refunds(first: 10) {
    id
    createdAt
    note
    totalRefundedSet { shopMoney { amount currencyCode } }
  }
}
"
    };
}

/// One page of a customer's orders.
pub const GET_CUSTOMER_ORDERS: &str = concat!(
    r"
query GetCustomerOrders($customerId: ID!, $first: Int!, $cursor: String) {
  customer(id: $customerId) {
    id
    orders(first: $first, after: $cursor) {
      edges { node { ...OrderFields } }
      pageInfo { hasNextPage endCursor }
    }
  }
}
",
    order_fields_fragment!()
);

/// A single order with its customer.
pub const GET_ORDER: &str = concat!(
    r"
query GetOrder($orderId: ID!) {
  order(id: $orderId) {
    ...OrderFields
    customer { id firstName lastName email }
  }
}
",
    order_fields_fragment!()
);

pub const ORDER_CANCEL: &str = r"
mutation OrderCancel(
  $orderId: ID!
  $refund: Boolean!
  $restock: Boolean!
  $reason: OrderCancelReason!
  $notifyCustomer: Boolean
  $staffNote: String
) {
  orderCancel(
    orderId: $orderId
    refund: $refund
    restock: $restock
    reason: $reason
    notifyCustomer: $notifyCustomer
    staffNote: $staffNote
  ) {
    job { id done }
    orderCancelUserErrors { field message code }
  }
}
";

pub const GET_RETURNABLE_FULFILLMENTS: &str = r"
query GetReturnableFulfillments($orderId: ID!) {
  returnableFulfillments(orderId: $orderId, first: 10) {
    edges {
      node {
        id
        returnableFulfillmentLineItems(first: 20) {
          edges {
            node {
              fulfillmentLineItem {
                id
                lineItem {
                  id
                  title
                  variant { id title sku }
                }
              }
              quantity
            }
          }
        }
      }
    }
  }
}
";

pub const RETURN_CREATE: &str = r"
mutation ReturnCreate($returnInput: ReturnInput!) {
  returnCreate(returnInput: $returnInput) {
    return {
      id
      status
      returnLineItems(first: 10) {
        edges {
          node {
            ... on ReturnLineItem {
              fulfillmentLineItem { lineItem { title sku } }
              quantity
              returnReason
              returnReasonNote
            }
          }
        }
      }
      order { id name }
    }
    userErrors { field message }
  }
}
";

pub const CUSTOMER_CREATE: &str = r"
mutation CustomerCreate($input: CustomerInput!) {
  customerCreate(input: $input) {
    customer {
      id
      firstName
      lastName
      defaultEmailAddress { emailAddress }
      defaultPhoneNumber { phoneNumber }
    }
    userErrors { field message }
  }
}
";

pub const CUSTOMER_DELETE: &str = r"
mutation CustomerDelete($id: ID!) {
  customerDelete(input: { id: $id }) {
    deletedCustomerId
    userErrors { field message }
  }
}
";

pub const CUSTOMER_REQUEST_DATA_ERASURE: &str = r"
mutation CustomerRequestDataErasure($customerId: ID!) {
  customerRequestDataErasure(customerId: $customerId) {
    customerId
    userErrors { field message code }
  }
}
";
