//! Shipping eligibility per seller.

use crate::order::Order;
use crate::seller::{SellerResolver, SellerSubOrder};
use crate::shipping::ShippingOffer;

/// Code the host registers the seller-only checker under.
pub const SELLER_ONLY_CHECKER_CODE: &str = "seller-only-eligibility-checker";

/// An offer is eligible for a sub-order iff its owner is the sub-order's seller.
///
/// Offers with no owner are eligible for nothing.
pub fn is_eligible(offer: &ShippingOffer, sub_order: &SellerSubOrder, resolver: &SellerResolver) -> bool {
    resolver
        .offer_owner(offer)
        .is_some_and(|owner| owner == sub_order.seller_channel_id)
}

/// Decides whether a shipping method may be offered on an order.
pub trait ShippingEligibilityChecker {
    /// Code the checker is registered under.
    fn code(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Check a method against an order.
    fn check(&self, order: &Order, offer: &ShippingOffer) -> bool;
}

/// Order-level checker: eligible when the order has a line from the offer's seller.
#[derive(Debug, Clone)]
pub struct SellerOnlyEligibilityChecker {
    resolver: SellerResolver,
}

impl SellerOnlyEligibilityChecker {
    pub fn new(resolver: SellerResolver) -> Self {
        Self { resolver }
    }
}

impl ShippingEligibilityChecker for SellerOnlyEligibilityChecker {
    fn code(&self) -> &str {
        SELLER_ONLY_CHECKER_CODE
    }

    fn description(&self) -> &str {
        "Only orders containing items from this seller are eligible"
    }

    fn check(&self, order: &Order, offer: &ShippingOffer) -> bool {
        let Some(owner) = self.resolver.offer_owner(offer) else {
            return false;
        };
        order.lines.iter().any(|line| self.resolver.resolve(line) == owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelRef;
    use crate::ids::{ChannelId, ProductId, VariantId};
    use crate::money::{Currency, Money};
    use crate::order::{OrderLine, OrderState, VariantRef};

    fn sub_order(seller: &str) -> SellerSubOrder {
        SellerSubOrder {
            seller_channel_id: ChannelId::new(seller),
            state: OrderState::ArrangingShipping,
            lines: Vec::new(),
            shipping_lines: Vec::new(),
        }
    }

    fn offer(channels: &[ChannelRef]) -> ShippingOffer {
        channels.iter().fold(
            ShippingOffer::new("m", "m", "M", Money::new(650, Currency::EUR)),
            |o, c| o.in_channel(c.clone()),
        )
    }

    #[test]
    fn test_eligible_only_for_owner() {
        let r = SellerResolver::new("1");
        let o = offer(&[ChannelRef::seller("1", "1"), ChannelRef::seller("2", "5")]);
        assert!(is_eligible(&o, &sub_order("2"), &r));
        assert!(!is_eligible(&o, &sub_order("3"), &r));
        assert!(!is_eligible(&o, &sub_order("1"), &r));
    }

    #[test]
    fn test_default_only_offer_belongs_to_default_seller() {
        let r = SellerResolver::new("1");
        let o = offer(&[ChannelRef::seller("1", "1")]);
        assert!(is_eligible(&o, &sub_order("1"), &r));
        assert!(!is_eligible(&o, &sub_order("2"), &r));
    }

    #[test]
    fn test_orphan_offer_never_eligible() {
        let r = SellerResolver::new("1");
        let o = offer(&[]);
        assert!(!is_eligible(&o, &sub_order("1"), &r));
        assert!(!is_eligible(&o, &sub_order("2"), &r));
    }

    #[test]
    fn test_seller_only_checker() {
        let checker = SellerOnlyEligibilityChecker::new(SellerResolver::new("1"));
        assert_eq!(checker.code(), "seller-only-eligibility-checker");

        let mut order = Order::new(Currency::EUR);
        let variant = VariantRef {
            id: VariantId::new("v"),
            product_id: ProductId::new("p"),
            sku: "A-HALL-250".to_string(),
            name: "250g".to_string(),
            channels: vec![ChannelRef::seller("1", "1"), ChannelRef::seller("2", "5")],
        };
        order
            .add_line(OrderLine::new(variant, 1, Money::new(599, Currency::EUR)).unwrap())
            .unwrap();

        assert!(checker.check(&order, &offer(&[ChannelRef::seller("2", "5")])));
        assert!(!checker.check(&order, &offer(&[ChannelRef::seller("3", "6")])));
        assert!(!checker.check(&order, &offer(&[])));
    }
}
