//! Demo data for development hosts.

use market_commerce::channel::Channel;
use market_commerce::shipping::SELLER_ONLY_CHECKER_CODE;
use market_commerce::{Currency, TaxCategoryId, ZoneId};
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::error::{step, MarketplaceError};
use crate::host::{
    CreateChannelInput, CreateCustomerInput, CreatePaymentMethodInput, CreateProductInput, CreateShippingMethodInput,
    CreateStockLocationInput, CreateTaxRateInput, CreateVariantInput, Host,
};
use crate::marketplace::MANUAL_FULFILLMENT;
use crate::payment::MANUAL_PAYMENT_CODE;

struct VariantSeed {
    sku: &'static str,
    name: &'static str,
    price: i64,
    stock_on_hand: i64,
}

struct ProductSeed {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    variants: &'static [VariantSeed],
}

struct SellerSeed {
    name: &'static str,
    stock_location: &'static str,
    shipping_code: &'static str,
    shipping_name: &'static str,
    shipping_rate: i64,
    products: &'static [ProductSeed],
}

const SELLERS: &[SellerSeed] = &[
    SellerSeed {
        name: "Seller A",
        stock_location: "Seller A Warehouse",
        shipping_code: "seller-a-std",
        shipping_name: "Seller A Standard",
        shipping_rate: 800,
        products: &[
            ProductSeed {
                name: "Aegean Olive Oil 500ml",
                slug: "aegean-olive-oil-500",
                description: "Cold-pressed extra virgin olive oil from Seller A.",
                variants: &[
                    VariantSeed { sku: "A-OLIVE-500", name: "500ml", price: 1299, stock_on_hand: 50 },
                    VariantSeed { sku: "A-OLIVE-750", name: "750ml", price: 1799, stock_on_hand: 30 },
                ],
            },
            ProductSeed {
                name: "Halloumi Cheese 250g",
                slug: "halloumi-250",
                description: "Traditional Cypriot halloumi.",
                variants: &[VariantSeed { sku: "A-HALL-250", name: "250g", price: 599, stock_on_hand: 100 }],
            },
        ],
    },
    SellerSeed {
        name: "Seller B",
        stock_location: "Seller B Depot",
        shipping_code: "seller-b-std",
        shipping_name: "Seller B Standard",
        shipping_rate: 650,
        products: &[
            ProductSeed {
                name: "Carob Syrup 300ml",
                slug: "carob-syrup-300",
                description: "Natural carob syrup from Seller B.",
                variants: &[
                    VariantSeed { sku: "B-CAROB-300", name: "300ml", price: 899, stock_on_hand: 60 },
                    VariantSeed { sku: "B-CAROB-500", name: "500ml", price: 1199, stock_on_hand: 40 },
                ],
            },
            ProductSeed {
                name: "Lefkara Embroidered Napkin",
                slug: "lefkara-napkin",
                description: "Handcrafted napkin with traditional patterns.",
                variants: &[VariantSeed { sku: "B-LEFK-001", name: "One Size", price: 2499, stock_on_hand: 15 }],
            },
        ],
    },
];

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("buyer1@example.com", "Buyer", "One"),
    ("buyer2@example.com", "Buyer", "Two"),
];

/// What a seed run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedReport {
    /// The host already had products; nothing was written.
    pub skipped: bool,
    pub tax_zone_id: Option<ZoneId>,
    pub seller_channels: Vec<Channel>,
    pub products_created: usize,
    pub customers_created: usize,
}

/// Lowercase `name` and collapse every non-alphanumeric run into `-`.
fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash {
            out.push('-');
            dash = true;
        }
    }
    out
}

/// Populate an empty host with two demo sellers, their catalog and
/// shipping, a 0% tax setup, manual payments and two customers.
///
/// Does nothing when products already exist.
pub async fn seed<H: Host>(host: &H, ctx: &RequestContext) -> Result<SeedReport, MarketplaceError> {
    if step("count products", host.product_count(ctx)).await? > 0 {
        tracing::info!("seed: database already contains data, skipping");
        return Ok(SeedReport {
            skipped: true,
            ..SeedReport::default()
        });
    }
    tracing::info!("seed: starting");

    let (zone_id, tax_category_id) = ensure_tax_setup(host, ctx).await?;
    ensure_manual_payment_method(host, ctx).await?;

    let mut report = SeedReport {
        tax_zone_id: Some(zone_id.clone()),
        ..SeedReport::default()
    };
    for entry in SELLERS {
        let channel = create_seller_with_data(host, ctx, entry, &zone_id, &tax_category_id).await?;
        report.products_created += entry.products.len();
        report.seller_channels.push(channel);
    }
    report.customers_created = create_customers(host, ctx).await?;

    tracing::info!(
        sellers = ?report.seller_channels.iter().map(|c| c.code.as_str()).collect::<Vec<_>>(),
        products = report.products_created,
        customers = report.customers_created,
        "seed: done"
    );
    Ok(report)
}

async fn ensure_tax_setup<H: Host>(
    host: &H,
    ctx: &RequestContext,
) -> Result<(ZoneId, TaxCategoryId), MarketplaceError> {
    let zone = step("create tax zone", host.create_zone(ctx, "Default Tax Zone")).await?;
    let default = step("get default channel", host.default_channel(ctx)).await?;
    step(
        "set default tax zone",
        host.set_default_tax_zone(ctx, &default.id, &zone.id),
    )
    .await?;

    let categories = step("find tax categories", host.find_all_tax_categories(ctx)).await?;
    let category = match categories.into_iter().find(|c| c.name.eq_ignore_ascii_case("standard")) {
        Some(category) => category,
        None => step("create tax category", host.create_tax_category(ctx, "Standard")).await?,
    };

    let rates = step("find tax rates", host.find_all_tax_rates(ctx)).await?;
    if !rates
        .iter()
        .any(|r| r.zone_id == zone.id && r.category_id == category.id)
    {
        step(
            "create tax rate",
            host.create_tax_rate(
                ctx,
                CreateTaxRateInput {
                    name: "Standard 0%".to_string(),
                    enabled: true,
                    value: 0,
                    zone_id: zone.id.clone(),
                    category_id: category.id.clone(),
                },
            ),
        )
        .await?;
    }
    Ok((zone.id, category.id))
}

async fn ensure_manual_payment_method<H: Host>(host: &H, ctx: &RequestContext) -> Result<(), MarketplaceError> {
    let methods = step("find payment methods", host.find_all_payment_methods(ctx)).await?;
    if methods.iter().any(|m| m.handler_code == MANUAL_PAYMENT_CODE) {
        return Ok(());
    }
    step(
        "create payment method",
        host.create_payment_method(
            ctx,
            CreatePaymentMethodInput {
                code: MANUAL_PAYMENT_CODE.to_string(),
                name: "Manual Payment".to_string(),
                description: "Pay offline / cash on delivery (dev)".to_string(),
                handler_code: MANUAL_PAYMENT_CODE.to_string(),
                enabled: true,
            },
        ),
    )
    .await?;
    Ok(())
}

async fn create_seller_with_data<H: Host>(
    host: &H,
    ctx: &RequestContext,
    entry: &SellerSeed,
    zone_id: &ZoneId,
    tax_category_id: &TaxCategoryId,
) -> Result<Channel, MarketplaceError> {
    let code = slugify(entry.name);
    let token = format!("{}-token", code);

    let seller = step("create seller", host.create_seller(ctx, entry.name)).await?;
    let channel = step(
        "create channel",
        host.create_channel(
            ctx,
            CreateChannelInput {
                code,
                token: token.clone(),
                seller_id: Some(seller.id),
                currency: Currency::EUR,
                prices_include_tax: false,
                default_shipping_zone_id: Some(zone_id.clone()),
                default_tax_zone_id: Some(zone_id.clone()),
            },
        ),
    )
    .await?;
    let seller_ctx = ctx.clone().with_channel_token(token);

    step(
        "create stock location",
        host.create_stock_location(
            &seller_ctx,
            CreateStockLocationInput {
                name: entry.stock_location.to_string(),
                description: format!("{} stock", entry.name),
            },
        ),
    )
    .await?;

    step(
        "create shipping method",
        host.create_shipping_method(
            &seller_ctx,
            CreateShippingMethodInput {
                code: entry.shipping_code.to_string(),
                name: entry.shipping_name.to_string(),
                description: format!("{} shipping", entry.name),
                checker_code: Some(SELLER_ONLY_CHECKER_CODE.to_string()),
                rate: entry.shipping_rate,
                rate_includes_tax: false,
                fulfillment_handler: MANUAL_FULFILLMENT.to_string(),
            },
        ),
    )
    .await?;

    for product in entry.products {
        let input = CreateProductInput {
            name: product.name.to_string(),
            slug: product.slug.to_string(),
            description: product.description.to_string(),
            variants: product
                .variants
                .iter()
                .map(|v| CreateVariantInput {
                    sku: v.sku.to_string(),
                    name: v.name.to_string(),
                    price: v.price,
                    stock_on_hand: v.stock_on_hand,
                    tax_category_id: Some(tax_category_id.clone()),
                })
                .collect(),
        };
        step(format!("create product {}", product.slug), host.create_product(&seller_ctx, input)).await?;
    }

    tracing::debug!(channel = %channel.code, channel_id = %channel.id, "seed: seller created");
    Ok(channel)
}

async fn create_customers<H: Host>(host: &H, ctx: &RequestContext) -> Result<usize, MarketplaceError> {
    let mut created = 0;
    for (email, first, last) in CUSTOMERS {
        if step("find customer", host.find_customer_by_email(ctx, email)).await?.is_some() {
            continue;
        }
        step(
            "create customer",
            host.create_customer(
                ctx,
                CreateCustomerInput {
                    email_address: email.to_string(),
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    phone_number: Some("+3570000000".to_string()),
                },
            ),
        )
        .await?;
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use market_commerce::seller::partition;

    use super::*;
    use crate::host::{ChannelService, InMemoryHost, OrderService};
    use crate::marketplace::Marketplace;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Seller A"), "seller-a");
        assert_eq!(slugify("Köln  Shop!"), "k-ln-shop-");
    }

    #[tokio::test]
    async fn test_seed_populates_demo_marketplace() {
        let host = InMemoryHost::new();
        let ctx = host.superadmin_context();

        let report = seed(&host, &ctx).await.unwrap();
        assert!(!report.skipped);
        assert_eq!(report.seller_channels.len(), 2);
        assert_eq!(report.seller_channels[0].code, "seller-a");
        assert_eq!(report.products_created, 4);
        assert_eq!(report.customers_created, 2);

        let snapshot = host.snapshot();
        assert_eq!(snapshot.tax_rates.len(), 1);
        assert_eq!(snapshot.tax_rates[0].value, 0);
        assert_eq!(snapshot.payment_methods[0].code, MANUAL_PAYMENT_CODE);
        let default = host.default_channel(&ctx).await.unwrap();
        assert_eq!(default.default_tax_zone_id, report.tax_zone_id);
        assert!(report.seller_channels.iter().all(|c| c.seller_id.is_some()));
        assert!(snapshot
            .shipping_methods
            .iter()
            .any(|m| m.code == "seller-b-std" && m.price.amount_minor == 650));
    }

    #[tokio::test]
    async fn test_seed_skips_when_products_exist() {
        let host = InMemoryHost::new();
        let ctx = host.superadmin_context();
        seed(&host, &ctx).await.unwrap();

        let again = seed(&host, &ctx).await.unwrap();
        assert!(again.skipped);
        assert_eq!(host.snapshot().customers.len(), 2);
    }

    #[tokio::test]
    async fn test_seeded_checkout_scenario() {
        let market = Marketplace::in_memory().unwrap();
        let host = market.host();
        let ctx = host.superadmin_context();
        seed(host, &ctx).await.unwrap();

        let variant = |sku: &str| {
            host.snapshot()
                .products
                .iter()
                .flat_map(|p| p.variants.clone())
                .find(|v| v.sku == sku)
                .unwrap()
                .id
        };
        let shopper = RequestContext::anonymous().with_session("s1");
        host.add_item_to_order(&shopper, &variant("A-OLIVE-500"), 1).await.unwrap();
        host.add_item_to_order(&shopper, &variant("B-CAROB-300"), 2).await.unwrap();

        let order = host.active_order(&shopper).await.unwrap().unwrap();
        let subs = partition(&order, &host.resolver().unwrap());
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].net_value().unwrap().amount_minor, 1299);
        assert_eq!(subs[1].net_value().unwrap().amount_minor, 1798);

        let groups = market.eligible_methods_by_seller(&shopper).await.unwrap();
        assert_eq!(groups[0].quotes[0].code, "seller-a-std");
        assert_eq!(groups[1].quotes[0].price, 650);
    }
}
