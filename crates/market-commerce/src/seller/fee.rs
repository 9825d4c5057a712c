//! Platform fee charged per seller sub-order.

use crate::error::CommerceError;
use crate::ids::{ChannelId, SurchargeId};
use crate::money::Money;
use crate::order::{Order, Surcharge};
use crate::seller::{partition, SellerResolver};
use serde::{Deserialize, Serialize};

/// Platform fee rate in basis points (10%).
pub const PLATFORM_FEE_BPS: u32 = 1_000;

/// Description shown on the fee surcharge.
pub const PLATFORM_FEE_DESCRIPTION: &str = "Platform fee (10%)";

/// Prefix of the fee surcharge SKU; the seller scope id follows.
pub const PLATFORM_FEE_SKU_PREFIX: &str = "PLATFORM-FEE-";

/// Fee owed on a net pre-tax value: `floor(net * 10%)`, never negative.
pub fn compute_fee(net: Money) -> Money {
    net.basis_points_floor(PLATFORM_FEE_BPS)
}

/// SKU identifying the fee surcharge of a seller.
pub fn fee_sku(seller_channel_id: &ChannelId) -> String {
    format!("{}{}", PLATFORM_FEE_SKU_PREFIX, seller_channel_id)
}

/// A fee surcharge waiting to be added to an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeCharge {
    pub seller_channel_id: ChannelId,
    pub description: String,
    pub sku: String,
    pub list_price: Money,
    pub list_price_includes_tax: bool,
    pub tax_rate: u32,
}

impl FeeCharge {
    /// Turn the charge into an order surcharge.
    pub fn into_surcharge(self) -> Surcharge {
        Surcharge {
            id: SurchargeId::generate(),
            description: self.description,
            sku: self.sku,
            list_price: self.list_price,
            list_price_includes_tax: self.list_price_includes_tax,
            tax_rate: self.tax_rate,
        }
    }
}

/// Fee charges the order still needs, one per seller partition.
///
/// Zero fees are skipped, as are sellers whose fee SKU is already on the
/// order.
pub fn pending_fee_charges(
    order: &Order,
    resolver: &SellerResolver,
) -> Result<Vec<FeeCharge>, CommerceError> {
    let mut charges = Vec::new();
    for sub_order in partition(order, resolver) {
        let fee = sub_order.platform_fee()?;
        if !fee.is_positive() {
            continue;
        }
        let sku = sub_order.fee_sku();
        if order.has_surcharge(&sku) {
            continue;
        }
        charges.push(FeeCharge {
            seller_channel_id: sub_order.seller_channel_id,
            description: PLATFORM_FEE_DESCRIPTION.to_string(),
            sku,
            list_price: fee,
            list_price_includes_tax: false,
            tax_rate: 0,
        });
    }
    Ok(charges)
}

/// Add any missing fee surcharges to the order in place.
///
/// Returns the charges that were added; a second call adds nothing.
pub fn apply_platform_fees(
    order: &mut Order,
    resolver: &SellerResolver,
) -> Result<Vec<FeeCharge>, CommerceError> {
    let charges = pending_fee_charges(order, resolver)?;
    for charge in &charges {
        order.surcharges.push(charge.clone().into_surcharge());
    }
    if !charges.is_empty() {
        order.touch();
    }
    Ok(charges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelRef;
    use crate::ids::{ProductId, VariantId};
    use crate::money::Currency;
    use crate::order::{OrderLine, VariantRef};

    fn eur(amount: i64) -> Money {
        Money::new(amount, Currency::EUR)
    }

    fn order(lines: &[(&str, &str, i64)]) -> Order {
        let mut order = Order::new(Currency::EUR);
        for (variant, seller, price) in lines {
            let v = VariantRef {
                id: VariantId::new(*variant),
                product_id: ProductId::new("p"),
                sku: variant.to_string(),
                name: variant.to_string(),
                channels: vec![ChannelRef::seller(*seller, *seller)],
            };
            order.add_line(OrderLine::new(v, 1, eur(*price)).unwrap()).unwrap();
        }
        order
    }

    #[test]
    fn test_compute_fee() {
        assert_eq!(compute_fee(eur(1500)).amount_minor, 150);
        assert_eq!(compute_fee(eur(1299)).amount_minor, 129);
        assert_eq!(compute_fee(eur(9)).amount_minor, 0);
        assert_eq!(compute_fee(eur(0)).amount_minor, 0);
        assert_eq!(compute_fee(eur(-500)).amount_minor, 0);
    }

    #[test]
    fn test_compute_fee_monotonic() {
        let mut last = 0;
        for net in (0..5_000).step_by(7) {
            let fee = compute_fee(eur(net)).amount_minor;
            assert!(fee >= last);
            last = fee;
        }
    }

    #[test]
    fn test_fee_sku() {
        assert_eq!(fee_sku(&ChannelId::new("2")), "PLATFORM-FEE-2");
    }

    #[test]
    fn test_pending_charges_per_seller() {
        let order = order(&[("a1", "A", 1000), ("a2", "A", 500), ("b1", "B", 2000)]);
        let charges = pending_fee_charges(&order, &SellerResolver::new("default")).unwrap();

        assert_eq!(charges.len(), 2);
        assert_eq!(charges[0].sku, "PLATFORM-FEE-A");
        assert_eq!(charges[0].list_price.amount_minor, 150);
        assert_eq!(charges[1].sku, "PLATFORM-FEE-B");
        assert_eq!(charges[1].list_price.amount_minor, 200);
        assert!(charges.iter().all(|c| !c.list_price_includes_tax && c.tax_rate == 0));
        assert_eq!(charges[0].description, "Platform fee (10%)");
    }

    #[test]
    fn test_zero_fee_skipped() {
        let order = order(&[("a1", "A", 9)]);
        assert!(pending_fee_charges(&order, &SellerResolver::new("default")).unwrap().is_empty());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut order = order(&[("a1", "A", 1000), ("b1", "B", 2000)]);
        let resolver = SellerResolver::new("default");

        assert_eq!(apply_platform_fees(&mut order, &resolver).unwrap().len(), 2);
        assert!(apply_platform_fees(&mut order, &resolver).unwrap().is_empty());
        assert_eq!(order.surcharges.len(), 2);
        assert_eq!(order.surcharge_total().unwrap().amount_minor, 300);
    }
}
