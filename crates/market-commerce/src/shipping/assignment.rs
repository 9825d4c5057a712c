//! Assigns shipping lines to the order lines they cover.

use crate::ids::OrderLineId;
use crate::order::Order;
use crate::seller::SellerResolver;
use crate::shipping::ShippingLine;

/// Order lines a shipping line covers.
///
/// When the method's owner is known, only that seller's lines are covered.
/// Otherwise the shipping line covers every line.
pub fn assign_shipping_line(
    shipping_line: &ShippingLine,
    order: &Order,
    resolver: &SellerResolver,
) -> Vec<OrderLineId> {
    match resolver.offer_owner(&shipping_line.method) {
        Some(owner) => order
            .lines
            .iter()
            .filter(|line| resolver.resolve(line) == owner)
            .map(|line| line.id.clone())
            .collect(),
        None => order.lines.iter().map(|line| line.id.clone()).collect(),
    }
}

/// Recompute the assignment of every shipping line on the order.
pub fn assign_all_shipping_lines(order: &mut Order, resolver: &SellerResolver) {
    let assignments: Vec<_> = order
        .shipping_lines
        .iter()
        .map(|sl| assign_shipping_line(sl, order, resolver))
        .collect();
    for (sl, ids) in order.shipping_lines.iter_mut().zip(assignments) {
        sl.assigned_line_ids = ids;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelRef;
    use crate::ids::{ProductId, VariantId};
    use crate::money::{Currency, Money};
    use crate::order::{OrderLine, VariantRef};
    use crate::shipping::ShippingOffer;

    fn order() -> Order {
        let mut order = Order::new(Currency::EUR);
        for (variant, seller) in [("a", "2"), ("b", "3")] {
            let v = VariantRef {
                id: VariantId::new(variant),
                product_id: ProductId::new(variant),
                sku: variant.to_string(),
                name: variant.to_string(),
                channels: vec![ChannelRef::seller(seller, seller)],
            };
            order
                .add_line(OrderLine::new(v, 1, Money::new(100, Currency::EUR)).unwrap())
                .unwrap();
        }
        order
    }

    #[test]
    fn test_assigns_owner_lines_only() {
        let order = order();
        let sl = ShippingLine::new(
            ShippingOffer::new("m", "m", "M", Money::new(800, Currency::EUR)).in_channel(ChannelRef::seller("2", "2")),
        );
        let ids = assign_shipping_line(&sl, &order, &SellerResolver::new("1"));
        assert_eq!(ids, vec![order.lines[0].id.clone()]);
    }

    #[test]
    fn test_unknown_owner_covers_all_lines() {
        let order = order();
        let sl = ShippingLine::new(ShippingOffer::new("m", "m", "M", Money::new(800, Currency::EUR)));
        assert_eq!(assign_shipping_line(&sl, &order, &SellerResolver::new("1")).len(), 2);
    }

    #[test]
    fn test_assign_all() {
        let mut order = order();
        order.shipping_lines.push(ShippingLine::new(
            ShippingOffer::new("m", "m", "M", Money::new(650, Currency::EUR)).in_channel(ChannelRef::seller("3", "3")),
        ));
        assign_all_shipping_lines(&mut order, &SellerResolver::new("1"));
        assert_eq!(order.shipping_lines[0].assigned_line_ids, vec![order.lines[1].id.clone()]);
    }
}
