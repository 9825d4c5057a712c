//! Per-seller order partitioning.

use crate::error::CommerceError;
use crate::ids::ChannelId;
use crate::money::Money;
use crate::order::{Order, OrderLine, OrderState};
use crate::seller::fee::{compute_fee, fee_sku};
use crate::seller::SellerResolver;
use crate::shipping::{is_eligible, ShippingLine, ShippingOffer};
use serde::{Deserialize, Serialize};

/// The part of an order that belongs to one seller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerSubOrder {
    /// Seller scope this partition belongs to.
    pub seller_channel_id: ChannelId,
    /// Lifecycle state copied from the parent order.
    pub state: OrderState,
    /// Lines resolving to the seller, in order.
    pub lines: Vec<OrderLine>,
    /// Attached shipping lines owned by the seller.
    pub shipping_lines: Vec<ShippingLine>,
}

impl SellerSubOrder {
    /// Net pre-tax merchandise value of the partition.
    pub fn net_value(&self) -> Result<Money, CommerceError> {
        let currency = self
            .lines
            .first()
            .map(|l| l.prorated_line_price.currency)
            .unwrap_or_default();
        Money::try_sum(self.lines.iter().map(|l| &l.prorated_line_price), currency)
            .ok_or(CommerceError::Overflow)
    }

    /// Platform fee owed on this partition.
    pub fn platform_fee(&self) -> Result<Money, CommerceError> {
        Ok(compute_fee(self.net_value()?))
    }

    /// SKU of this partition's fee surcharge.
    pub fn fee_sku(&self) -> String {
        fee_sku(&self.seller_channel_id)
    }

    /// Offers from `offers` that this partition may use.
    pub fn eligible<'a>(
        &self,
        offers: &'a [ShippingOffer],
        resolver: &SellerResolver,
    ) -> Vec<&'a ShippingOffer> {
        offers
            .iter()
            .filter(|offer| is_eligible(offer, self, resolver))
            .collect()
    }
}

/// Group an order's lines by seller, in first-occurrence order.
///
/// Every line lands in exactly one partition. Each partition receives the
/// order's shipping lines whose method the seller owns.
pub fn partition(order: &Order, resolver: &SellerResolver) -> Vec<SellerSubOrder> {
    let mut groups: Vec<SellerSubOrder> = Vec::new();

    for line in &order.lines {
        let seller = resolver.resolve(line);
        match groups.iter_mut().find(|g| g.seller_channel_id == seller) {
            Some(group) => group.lines.push(line.clone()),
            None => groups.push(SellerSubOrder {
                seller_channel_id: seller,
                state: order.state,
                lines: vec![line.clone()],
                shipping_lines: Vec::new(),
            }),
        }
    }

    for group in &mut groups {
        group.shipping_lines = order
            .shipping_lines
            .iter()
            .filter(|sl| is_eligible(&sl.method, group, resolver))
            .cloned()
            .collect();
    }

    groups
}

/// Seller scopes with lines in the order, in first-occurrence order.
pub fn seller_ids(order: &Order, resolver: &SellerResolver) -> Vec<ChannelId> {
    let mut ids: Vec<ChannelId> = Vec::new();
    for line in &order.lines {
        let seller = resolver.resolve(line);
        if !ids.contains(&seller) {
            ids.push(seller);
        }
    }
    ids
}

/// Split an order into per-seller contents after tagging every line.
///
/// Lines come back with their `seller_channel_id` set.
pub fn split_order(order: &mut Order, resolver: &SellerResolver) -> Vec<SellerSubOrder> {
    for line in &mut order.lines {
        resolver.set_order_line_seller_channel(line);
    }
    let groups = partition(order, resolver);
    tracing::debug!(
        order = %order.code,
        sellers = groups.len(),
        "order split by seller"
    );
    groups
}
