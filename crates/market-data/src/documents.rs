//! GraphQL documents sent to the shop and admin APIs.

pub const QUERY_ELIGIBLE_METHODS_BY_SELLER: &str = r#"
query EligibleMethodsBySeller {
  eligibleMethodsBySeller {
    sellerChannelId
    sellerName
    quotes { id code name priceWithTax price }
  }
}
"#;

pub const MUTATION_SET_SHIPPING_PER_SELLER: &str = r#"
mutation SetShippingPerSeller($selections: [SellerShippingSelectionInput!]!) {
  setShippingPerSeller(selections: $selections) { id }
}
"#;

pub const MUTATION_REGISTER_SELLER: &str = r#"
mutation RegisterSeller($input: RegisterSellerInput!) {
  registerSeller(input: $input) {
    sellerId
    channelId
    channelToken
    adminEmailAddress
    adminPassword
  }
}
"#;

pub const MUTATION_ADD_TO_ORDER: &str = r#"
mutation AddToOrder($variantId: ID!, $quantity: Int!) {
  addItemToOrder(productVariantId: $variantId, quantity: $quantity) {
    __typename
    ... on Order { id code totalQuantity totalWithTax state }
    ... on ErrorResult { errorCode message }
  }
}
"#;

pub const MUTATION_ADJUST_ORDER_LINE: &str = r#"
mutation AdjustOrderLine($orderLineId: ID!, $quantity: Int!) {
  adjustOrderLine(orderLineId: $orderLineId, quantity: $quantity) {
    __typename
    ... on Order { id totalQuantity totalWithTax }
    ... on ErrorResult { errorCode message }
  }
}
"#;

pub const MUTATION_REMOVE_ORDER_LINE: &str = r#"
mutation RemoveOrderLine($orderLineId: ID!) {
  removeOrderLine(orderLineId: $orderLineId) {
    __typename
    ... on Order { id totalQuantity totalWithTax }
    ... on ErrorResult { errorCode message }
  }
}
"#;

pub const QUERY_ACTIVE_ORDER_LINES: &str = r#"
query ActiveOrderLines {
  activeOrder {
    id
    lines { id }
  }
}
"#;

pub const QUERY_ACTIVE_ORDER_QUANTITY: &str = r#"
query ActiveOrderQuantity {
  activeOrder { totalQuantity }
}
"#;

/// Customer, addresses, state transition and manual payment in one request.
pub const MUTATION_CHECKOUT: &str = r#"
mutation Checkout(
  $email: String!
  $firstName: String!
  $lastName: String!
  $streetLine1: String!
  $city: String!
  $postalCode: String!
  $countryCode: String!
) {
  setCustomerForOrder(input: { firstName: $firstName, lastName: $lastName, emailAddress: $email }) {
    ... on Order { id }
    ... on ErrorResult { errorCode message }
  }
  setShippingAddress(input: {
    streetLine1: $streetLine1, city: $city, postalCode: $postalCode, countryCode: $countryCode
  }) {
    ... on Order { id }
    ... on ErrorResult { errorCode message }
  }
  setBillingAddress(input: {
    streetLine1: $streetLine1, city: $city, postalCode: $postalCode, countryCode: $countryCode
  }) {
    ... on Order { id }
    ... on ErrorResult { errorCode message }
  }
  transitionOrderToState(state: "ArrangingPayment") {
    ... on Order { id state code }
    ... on ErrorResult { errorCode message }
  }
  addPaymentToOrder(input: { method: "manual", metadata: {} }) {
    ... on Order { id code state }
    ... on ErrorResult { errorCode message }
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_name_their_root_field() {
        let cases = [
            (QUERY_ELIGIBLE_METHODS_BY_SELLER, "eligibleMethodsBySeller"),
            (MUTATION_SET_SHIPPING_PER_SELLER, "setShippingPerSeller("),
            (MUTATION_REGISTER_SELLER, "registerSeller("),
            (MUTATION_ADD_TO_ORDER, "addItemToOrder("),
            (MUTATION_ADJUST_ORDER_LINE, "adjustOrderLine("),
            (MUTATION_REMOVE_ORDER_LINE, "removeOrderLine("),
            (QUERY_ACTIVE_ORDER_QUANTITY, "totalQuantity"),
        ];
        for (doc, field) in cases {
            assert!(doc.contains(field), "{} missing", field);
        }
    }

    #[test]
    fn test_checkout_pays_after_arranging_payment() {
        let transition = MUTATION_CHECKOUT.find("transitionOrderToState").unwrap();
        let payment = MUTATION_CHECKOUT.find("addPaymentToOrder").unwrap();
        assert!(transition < payment);
    }
}
