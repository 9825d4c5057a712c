//! Per-seller shipping selection gate.

use crate::error::SelectionError;
use crate::ids::{ChannelId, ShippingMethodId};
use crate::seller::SellerSubOrder;
use serde::{Deserialize, Serialize};

/// A customer's shipping choice for one seller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SellerShippingSelection {
    pub seller_channel_id: ChannelId,
    pub shipping_method_id: ShippingMethodId,
}

impl SellerShippingSelection {
    pub fn new(seller_channel_id: impl Into<ChannelId>, shipping_method_id: impl Into<ShippingMethodId>) -> Self {
        Self {
            seller_channel_id: seller_channel_id.into(),
            shipping_method_id: shipping_method_id.into(),
        }
    }
}

/// Validated selections, in seller-group order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingPlan {
    primary: ShippingMethodId,
    selections: Vec<SellerShippingSelection>,
}

impl ShippingPlan {
    /// The method passed to the host as the primary shipping method.
    pub fn primary(&self) -> &ShippingMethodId {
        &self.primary
    }

    /// All chosen method ids, primary first.
    pub fn method_ids(&self) -> Vec<ShippingMethodId> {
        self.selections.iter().map(|s| s.shipping_method_id.clone()).collect()
    }

    pub fn selections(&self) -> &[SellerShippingSelection] {
        &self.selections
    }
}

/// Check that every required seller has a selection.
///
/// Fails with `MissingSelection` for the first required seller lacking one.
/// Selections for sellers outside `required` are ignored, unless nothing is
/// required, in which case they are taken as given.
pub fn validate_selections(
    required: &[ChannelId],
    selections: &[SellerShippingSelection],
) -> Result<ShippingPlan, SelectionError> {
    let mut ordered = Vec::with_capacity(required.len());
    for seller in required {
        let chosen = selections
            .iter()
            .find(|s| &s.seller_channel_id == seller)
            .ok_or_else(|| SelectionError::MissingSelection(seller.clone()))?;
        ordered.push(chosen.clone());
    }

    if required.is_empty() {
        ordered = selections.to_vec();
    }
    let primary = ordered
        .first()
        .map(|s| s.shipping_method_id.clone())
        .ok_or(SelectionError::NoShippingMethod)?;

    Ok(ShippingPlan {
        primary,
        selections: ordered,
    })
}

/// Require exactly one owned shipping line per seller partition.
pub fn ensure_shipping_complete(sub_orders: &[SellerSubOrder]) -> Result<(), SelectionError> {
    for sub_order in sub_orders {
        match sub_order.shipping_lines.len() {
            1 => {}
            0 => return Err(SelectionError::MissingSelection(sub_order.seller_channel_id.clone())),
            count => {
                return Err(SelectionError::AmbiguousSelection {
                    seller_channel_id: sub_order.seller_channel_id.clone(),
                    count,
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<ChannelId> {
        raw.iter().map(|s| ChannelId::new(*s)).collect()
    }

    #[test]
    fn test_missing_second_seller() {
        let err = validate_selections(&ids(&["A", "B"]), &[SellerShippingSelection::new("A", "m1")]).unwrap_err();
        assert_eq!(err, SelectionError::MissingSelection(ChannelId::new("B")));
        assert_eq!(err.to_string(), "Missing shipping selection for seller channel B");
    }

    #[test]
    fn test_first_missing_is_reported() {
        let err = validate_selections(&ids(&["A", "B"]), &[]).unwrap_err();
        assert_eq!(err, SelectionError::MissingSelection(ChannelId::new("A")));
    }

    #[test]
    fn test_plan_follows_seller_order() {
        let plan = validate_selections(
            &ids(&["A", "B"]),
            &[
                SellerShippingSelection::new("B", "m2"),
                SellerShippingSelection::new("Z", "m9"),
                SellerShippingSelection::new("A", "m1"),
            ],
        )
        .unwrap();
        assert_eq!(plan.primary().as_str(), "m1");
        assert_eq!(plan.method_ids(), vec![ShippingMethodId::new("m1"), ShippingMethodId::new("m2")]);
    }

    #[test]
    fn test_nothing_selected() {
        assert_eq!(validate_selections(&[], &[]).unwrap_err(), SelectionError::NoShippingMethod);
        let plan = validate_selections(&[], &[SellerShippingSelection::new("A", "m1")]).unwrap();
        assert_eq!(plan.selections().len(), 1);
    }

    #[test]
    fn test_selection_wire_names() {
        let json = serde_json::to_value(SellerShippingSelection::new("2", "7")).unwrap();
        assert_eq!(json, serde_json::json!({ "sellerChannelId": "2", "shippingMethodId": "7" }));
    }
}
