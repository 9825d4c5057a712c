//! GraphQL schema extension the marketplace adds to the shop and admin APIs.

/// SDL for the marketplace types, queries and mutations.
pub const MARKETPLACE_SDL: &str = r#"
extend type Mutation {
  registerSeller(input: RegisterSellerInput!): RegisterSellerPayload!
}

input RegisterSellerInput {
  name: String!
  adminEmailAddress: String!
  adminPassword: String!
}

type RegisterSellerPayload {
  sellerId: ID!
  channelId: ID!
  channelToken: String!
  adminEmailAddress: String!
  adminPassword: String!
}

type SellerShippingQuote {
  id: ID!
  code: String!
  name: String!
  price: Money!
  priceWithTax: Money!
}

type SellerEligibleMethods {
  sellerChannelId: ID!
  sellerName: String
  quotes: [SellerShippingQuote!]!
}

input SellerShippingSelectionInput {
  sellerChannelId: ID!
  shippingMethodId: ID!
}

extend type Query {
  eligibleMethodsBySeller: [SellerEligibleMethods!]!
}

extend type Mutation {
  setShippingPerSeller(selections: [SellerShippingSelectionInput!]!): Order!
}
"#;

/// Root fields the extension adds, as `(operation type, field)`.
pub const MARKETPLACE_FIELDS: &[(&str, &str)] = &[
    ("Mutation", "registerSeller"),
    ("Query", "eligibleMethodsBySeller"),
    ("Mutation", "setShippingPerSeller"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdl_declares_every_field() {
        for (_, field) in MARKETPLACE_FIELDS {
            let declared = MARKETPLACE_SDL.contains(&format!("{}(", field))
                || MARKETPLACE_SDL.contains(&format!("{}:", field));
            assert!(declared, "missing {}", field);
        }
    }

    #[test]
    fn test_sdl_matches_payload_fields() {
        let payload = serde_json::to_value(crate::marketplace::RegisterSellerPayload {
            seller_id: "1".into(),
            channel_id: "2".into(),
            channel_token: "t".to_string(),
            admin_email_address: "a@example.com".to_string(),
            admin_password: "pw".to_string(),
        })
        .unwrap();
        for key in payload.as_object().unwrap().keys() {
            assert!(MARKETPLACE_SDL.contains(&format!("  {}:", key)), "missing {}", key);
        }
    }
}
