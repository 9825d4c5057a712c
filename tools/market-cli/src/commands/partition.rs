//! Offline per-seller partition and platform fee report.

use std::fs;

use anyhow::{bail, Context as _, Result};
use market_api::host::{OrderService, ProductVariant};
use market_api::{seed, Marketplace, RequestContext};
use market_commerce::prelude::*;
use serde::Serialize;

use super::PartitionArgs;
use crate::context::Context;
use crate::output::fee_cell;

/// One seller's share of an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionRow {
    pub seller_channel_id: ChannelId,
    pub lines: usize,
    pub quantity: i64,
    pub net: Money,
    pub fee: Money,
    pub fee_sku: String,
    /// Whether the order already carries this seller's fee surcharge.
    pub fee_applied: bool,
    pub shipping_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionReport {
    pub order_code: String,
    pub state: OrderState,
    pub sellers: Vec<PartitionRow>,
    pub total_fee: Money,
    /// Sellers without a shipping line; payment cannot be arranged yet.
    pub missing_shipping: Vec<ChannelId>,
}

/// Partition `order` and price each seller's platform fee.
pub fn partition_report(order: &Order, resolver: &SellerResolver) -> Result<PartitionReport> {
    let mut sellers = Vec::new();
    let mut missing_shipping = Vec::new();
    let mut total_fee = Money::zero(order.currency);

    for sub_order in partition(order, resolver) {
        let net = sub_order.net_value()?;
        let fee = sub_order.platform_fee()?;
        total_fee = total_fee.try_add(&fee).context("Fee total overflowed")?;
        if sub_order.shipping_lines.is_empty() {
            missing_shipping.push(sub_order.seller_channel_id.clone());
        }
        let fee_sku = sub_order.fee_sku();
        sellers.push(PartitionRow {
            lines: sub_order.lines.len(),
            quantity: sub_order.lines.iter().map(|l| l.quantity).sum(),
            net,
            fee,
            fee_applied: order.has_surcharge(&fee_sku),
            fee_sku,
            shipping_lines: sub_order.shipping_lines.len(),
            seller_channel_id: sub_order.seller_channel_id,
        });
    }

    Ok(PartitionReport {
        order_code: order.code.clone(),
        state: order.state,
        sellers,
        total_fee,
        missing_shipping,
    })
}

/// Run the partition command.
pub async fn run(args: PartitionArgs, ctx: &Context) -> Result<()> {
    let (order, resolver) = match &args.order {
        Some(path) => {
            let path = ctx.resolve_path(path);
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read order file: {}", path.display()))?;
            let order: Order = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse order file: {}", path.display()))?;
            (order, SellerResolver::new(args.default_channel.as_str()))
        }
        None => {
            ctx.output.debug("No order file given, building a demo order");
            demo_order().await?
        }
    };

    let report = partition_report(&order, &resolver)?;

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    ctx.output.header(&format!("Order {} ({})", report.order_code, report.state));
    ctx.output
        .table_row(&["SELLER", "LINES", "QTY", "NET", "SHIPPING", "FEE SKU", "FEE"], &[8, 6, 5, 10, 9, 18, 8]);
    for row in &report.sellers {
        let fee = if row.fee_applied {
            format!("{} (applied)", fee_cell(&row.fee))
        } else {
            fee_cell(&row.fee)
        };
        ctx.output.table_row(
            &[
                row.seller_channel_id.as_str(),
                &row.lines.to_string(),
                &row.quantity.to_string(),
                &row.net.display(),
                &row.shipping_lines.to_string(),
                &row.fee_sku,
                &fee,
            ],
            &[8, 6, 5, 10, 9, 18, 8],
        );
    }
    ctx.output.kv("Total platform fee", &report.total_fee.display());

    for seller in &report.missing_shipping {
        ctx.output
            .warn(&format!("Missing shipping selection for seller channel {}", seller));
    }
    Ok(())
}

/// Seed an in-memory marketplace and fill a cart with one variant per seller.
async fn demo_order() -> Result<(Order, SellerResolver)> {
    let market = Marketplace::in_memory()?;
    let host = market.host();
    let report = seed(host, &host.superadmin_context()).await?;

    let variants: Vec<ProductVariant> = host
        .snapshot()
        .products
        .into_iter()
        .flat_map(|p| p.variants)
        .collect();

    let shopper = RequestContext::anonymous().with_session("market-cli-demo");
    for channel in &report.seller_channels {
        let Some(variant) = variants
            .iter()
            .find(|v| v.channels.iter().any(|c| c.id == channel.id))
        else {
            continue;
        };
        host.add_item_to_order(&shopper, &variant.id, 1).await?;
    }

    let Some(order) = host.active_order(&shopper).await? else {
        bail!("Demo marketplace has no seller products");
    };
    Ok((order, host.resolver()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(variant: &str, seller: &str, price: i64, quantity: i64) -> OrderLine {
        let variant = VariantRef {
            id: VariantId::new(variant),
            product_id: ProductId::new("p"),
            sku: variant.to_string(),
            name: variant.to_string(),
            channels: vec![ChannelRef::seller("1", "1"), ChannelRef::seller(seller, seller)],
        };
        OrderLine::new(variant, quantity, Money::new(price, Currency::EUR)).unwrap()
    }

    #[test]
    fn test_partition_report_fees() {
        let mut order = Order::new(Currency::EUR);
        order.add_line(line("a", "2", 1299, 1)).unwrap();
        order.add_line(line("b", "3", 899, 2)).unwrap();

        let report = partition_report(&order, &SellerResolver::new("1")).unwrap();
        assert_eq!(report.sellers.len(), 2);
        assert_eq!(report.sellers[0].net.amount_minor, 1299);
        assert_eq!(report.sellers[0].fee.amount_minor, 129);
        assert_eq!(report.sellers[0].fee_sku, "PLATFORM-FEE-2");
        assert_eq!(report.sellers[1].quantity, 2);
        assert_eq!(report.sellers[1].fee.amount_minor, 179);
        assert_eq!(report.total_fee.amount_minor, 308);
        assert_eq!(report.missing_shipping.len(), 2);
    }

    #[test]
    fn test_partition_report_marks_applied_fee() {
        let mut order = Order::new(Currency::EUR);
        order.add_line(line("a", "2", 1500, 1)).unwrap();
        let resolver = SellerResolver::new("1");
        apply_platform_fees(&mut order, &resolver).unwrap();

        let report = partition_report(&order, &resolver).unwrap();
        assert!(report.sellers[0].fee_applied);
    }

    #[tokio::test]
    async fn test_demo_order_spans_both_sellers() {
        let (order, resolver) = demo_order().await.unwrap();
        let report = partition_report(&order, &resolver).unwrap();
        assert_eq!(report.sellers.len(), 2);
        assert!(report.sellers.iter().all(|s| s.fee.is_positive()));
    }
}
