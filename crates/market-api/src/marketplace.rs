//! Marketplace operations: seller onboarding and per-seller shipping.

use std::sync::Arc;

use market_commerce::order::Order;
use market_commerce::seller::{seller_ids, SellerResolver};
use market_commerce::shipping::{validate_selections, SellerShippingSelection, ShippingQuote, SELLER_ONLY_CHECKER_CODE};
use market_commerce::{ChannelId, RoleId, SellerId, ShippingMethodId};
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::error::{step, BackendError, MarketplaceError, INSUFFICIENT_PERMISSIONS};
use crate::host::{
    CreateAdministratorInput, CreateChannelInput, CreateRoleInput, CreateShippingMethodInput, CreateStockLocationInput,
    Host, InMemoryHost, Permission, SELLER_ADMIN_PERMISSIONS, SUPER_ADMIN_ROLE_CODE,
};
use crate::listener::PlatformFeeListener;
use crate::payment::ManualPaymentHandler;

/// Fulfillment handler for every method the marketplace creates.
pub const MANUAL_FULFILLMENT: &str = "manual-fulfillment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSellerInput {
    pub name: String,
    pub admin_email_address: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSellerPayload {
    pub seller_id: SellerId,
    pub channel_id: ChannelId,
    pub channel_token: String,
    pub admin_email_address: String,
    pub admin_password: String,
}

/// A quote as shown to the shopper, amounts in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerShippingQuote {
    pub id: ShippingMethodId,
    pub code: String,
    pub name: String,
    pub price: i64,
    pub price_with_tax: i64,
}

impl From<&ShippingQuote> for SellerShippingQuote {
    fn from(quote: &ShippingQuote) -> Self {
        Self {
            id: quote.id.clone(),
            code: quote.code.clone(),
            name: quote.name.clone(),
            price: quote.price.amount_minor,
            price_with_tax: quote.price_with_tax.amount_minor,
        }
    }
}

/// Eligible shipping quotes for one seller in the active order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerEligibleMethods {
    pub seller_channel_id: ChannelId,
    pub seller_name: Option<String>,
    pub quotes: Vec<SellerShippingQuote>,
}

/// Group quotes under the sellers of an order.
///
/// A quote goes to the seller named in its metadata when that seller is in
/// the order, otherwise to `owner`. Quotes matching neither are dropped.
pub fn bucket_quotes(
    sellers: &[(ChannelId, Option<String>)],
    quotes: &[(ShippingQuote, Option<ChannelId>)],
) -> Vec<SellerEligibleMethods> {
    let mut buckets: Vec<SellerEligibleMethods> = sellers
        .iter()
        .map(|(id, name)| SellerEligibleMethods {
            seller_channel_id: id.clone(),
            seller_name: name.clone(),
            quotes: Vec::new(),
        })
        .collect();

    for (quote, owner) in quotes {
        let from_meta = quote
            .metadata_seller_channel()
            .and_then(|meta| buckets.iter().position(|b| b.seller_channel_id.as_str() == meta));
        let target = from_meta.or_else(|| {
            owner
                .as_ref()
                .and_then(|o| buckets.iter().position(|b| &b.seller_channel_id == o))
        });
        if let Some(index) = target {
            buckets[index].quotes.push(SellerShippingQuote::from(quote));
        }
    }
    buckets
}

/// The seller administrator is optional when the caller may not create one.
fn tolerate_forbidden_administrator<T>(result: Result<T, BackendError>, seller_id: &SellerId) -> Result<(), MarketplaceError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.is(INSUFFICIENT_PERMISSIONS) => {
            tracing::warn!(seller_id = %seller_id, "skipping seller administrator: insufficient permissions");
            Ok(())
        }
        Err(e) => Err(MarketplaceError::step("create administrator", e)),
    }
}

/// Marketplace operations over a host.
pub struct Marketplace<H> {
    host: Arc<H>,
}

impl<H> Clone for Marketplace<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

impl Marketplace<InMemoryHost> {
    /// An in-memory host with the fee listener and manual payments installed.
    pub fn in_memory() -> Result<Self, BackendError> {
        let host = InMemoryHost::new();
        host.subscribe(Arc::new(PlatformFeeListener::new(host.resolver()?)));
        host.register_payment_handler(Arc::new(ManualPaymentHandler));
        Ok(Self::new(Arc::new(host)))
    }
}

impl<H: Host> Marketplace<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    async fn resolver(&self, ctx: &RequestContext) -> Result<SellerResolver, MarketplaceError> {
        let default = step("get default channel", self.host.default_channel(ctx)).await?;
        Ok(SellerResolver::new(default.id))
    }

    /// Provision a seller with its own channel, admin role, stock location
    /// and a free standard shipping method.
    ///
    /// The caller must be a SuperAdmin. Steps run in order and are not
    /// rolled back when a later one fails.
    pub async fn register_seller(
        &self,
        ctx: &RequestContext,
        input: RegisterSellerInput,
    ) -> Result<RegisterSellerPayload, MarketplaceError> {
        let host = &self.host;
        let RegisterSellerInput {
            name,
            admin_email_address,
            admin_password,
        } = input;

        let user_id = ctx
            .active_user_id
            .clone()
            .ok_or_else(|| MarketplaceError::step("precheck", "No active user on context"))?;
        step("load current administrator", host.find_administrator_by_user(ctx, &user_id))
            .await?
            .ok_or_else(|| MarketplaceError::step("precheck", "Current user is not an Administrator"))?;
        let user = step("load current user with roles", host.find_user(ctx, &user_id))
            .await?
            .ok_or_else(|| MarketplaceError::step("precheck", "Active user entity not found"))?;
        self.require_super_admin(ctx, &user.role_ids).await?;

        let seller = step("create seller", host.create_seller(ctx, &name)).await?;
        let default = step("get default channel", host.default_channel(ctx)).await?;

        let (shipping_zone_id, tax_zone_id) =
            match (default.default_shipping_zone_id.clone(), default.default_tax_zone_id.clone()) {
                (Some(shipping), Some(tax)) => (shipping, tax),
                (shipping, tax) => {
                    let zones = step("find zones", host.find_all_zones(ctx)).await?;
                    let fallback = zones.first().map(|z| z.id.clone()).ok_or_else(|| {
                        MarketplaceError::step(
                            "zones",
                            "No Zones exist. Create at least one Zone (Settings → Zones) or run seed.",
                        )
                    })?;
                    (shipping.unwrap_or_else(|| fallback.clone()), tax.unwrap_or(fallback))
                }
            };

        let channel = step(
            "create channel",
            host.create_channel(
                ctx,
                CreateChannelInput {
                    code: format!("seller-{}", seller.id),
                    token: format!("seller-{}-{}", seller.id, chrono::Utc::now().timestamp_millis()),
                    seller_id: Some(seller.id.clone()),
                    currency: default.currency,
                    prices_include_tax: default.prices_include_tax,
                    default_shipping_zone_id: Some(shipping_zone_id),
                    default_tax_zone_id: Some(tax_zone_id),
                },
            ),
        )
        .await?;

        for role_id in &user.role_ids {
            step(
                format!("assign caller role \"{}\" to new channel", role_id),
                host.assign_role_to_channel(ctx, role_id, &channel.id),
            )
            .await?;
        }
        if let Some(super_admin) = host.find_role_by_code(ctx, SUPER_ADMIN_ROLE_CODE).await? {
            step(
                "assign SuperAdmin role to new channel",
                host.assign_role_to_channel(ctx, &super_admin.id, &channel.id),
            )
            .await?;
        }

        let role = step(
            "create role",
            host.create_role(
                ctx,
                CreateRoleInput {
                    code: format!("seller-admin-{}", seller.id),
                    description: format!("Admin role for {}", seller.name),
                    permissions: SELLER_ADMIN_PERMISSIONS.to_vec(),
                },
            ),
        )
        .await?;
        step("assign role to channel", host.assign_role_to_channel(ctx, &role.id, &channel.id)).await?;

        let admin = host
            .create_administrator(
                ctx,
                CreateAdministratorInput {
                    first_name: seller.name.clone(),
                    last_name: "Admin".to_string(),
                    email_address: admin_email_address.clone(),
                    password: admin_password.clone(),
                    role_ids: vec![role.id.clone()],
                },
            )
            .await;
        tolerate_forbidden_administrator(admin, &seller.id)?;

        let stock = step(
            "create stock location",
            host.create_stock_location(
                ctx,
                CreateStockLocationInput {
                    name: format!("{} Default", seller.name),
                    description: format!("Default stock location for {}", seller.name),
                },
            ),
        )
        .await?;
        step(
            "assign stock location to channel",
            host.assign_stock_location_to_channel(ctx, &stock.id, &channel.id),
        )
        .await?;

        let method = step(
            "create shipping method",
            host.create_shipping_method(
                ctx,
                CreateShippingMethodInput {
                    code: format!("standard-free-{}", seller.id),
                    name: "Standard (Free)".to_string(),
                    description: "Default free shipping".to_string(),
                    checker_code: Some(SELLER_ONLY_CHECKER_CODE.to_string()),
                    rate: 0,
                    rate_includes_tax: false,
                    fulfillment_handler: MANUAL_FULFILLMENT.to_string(),
                },
            ),
        )
        .await?;
        step(
            "assign shipping method to channel",
            host.assign_shipping_methods_to_channel(ctx, &channel.id, std::slice::from_ref(&method.id)),
        )
        .await?;

        tracing::info!(seller_id = %seller.id, channel_id = %channel.id, "seller registered");

        Ok(RegisterSellerPayload {
            seller_id: seller.id,
            channel_id: channel.id,
            channel_token: channel.token,
            admin_email_address,
            admin_password,
        })
    }

    /// Fails unless one of `role_ids` carries the SuperAdmin permission.
    async fn require_super_admin(&self, ctx: &RequestContext, role_ids: &[RoleId]) -> Result<(), MarketplaceError> {
        for role_id in role_ids {
            let role = step("load current user roles", self.host.find_role(ctx, role_id)).await?;
            if role.is_some_and(|r| r.permissions.contains(&Permission::SuperAdmin)) {
                return Ok(());
            }
        }
        Err(MarketplaceError::step(
            "precheck",
            BackendError::with_code(INSUFFICIENT_PERMISSIONS, "Registering a seller requires the SuperAdmin permission"),
        ))
    }

    /// Eligible shipping quotes for the active order, grouped by seller.
    ///
    /// Empty when there is no active order.
    pub async fn eligible_methods_by_seller(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<SellerEligibleMethods>, MarketplaceError> {
        let Some(order) = step("load active order", self.host.active_order(ctx)).await? else {
            return Ok(Vec::new());
        };
        let resolver = self.resolver(ctx).await?;
        let ids = seller_ids(&order, &resolver);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sellers = Vec::with_capacity(ids.len());
        for id in ids {
            let name = match self.host.find_channel(ctx, &id).await {
                Ok(channel) => channel.map(|c| c.code),
                Err(e) => {
                    tracing::debug!(seller_channel_id = %id, error = %e, "seller channel lookup failed");
                    None
                }
            };
            sellers.push((id, name));
        }

        let quotes = step(
            "eligible shipping methods",
            self.host.eligible_shipping_methods(ctx, &order.id),
        )
        .await?;

        let mut owned = Vec::with_capacity(quotes.len());
        for quote in quotes {
            let named = quote
                .metadata_seller_channel()
                .is_some_and(|meta| sellers.iter().any(|(id, _)| id.as_str() == meta));
            let owner = if named {
                None
            } else {
                step("find shipping method", self.host.find_shipping_method(ctx, &quote.id))
                    .await?
                    .and_then(|method| resolver.offer_owner(&method))
            };
            owned.push((quote, owner));
        }

        Ok(bucket_quotes(&sellers, &owned))
    }

    /// Attach one shipping method per seller to the active order.
    pub async fn set_shipping_per_seller(
        &self,
        ctx: &RequestContext,
        selections: &[SellerShippingSelection],
    ) -> Result<Order, MarketplaceError> {
        let order = step("load active order", self.host.active_order(ctx))
            .await?
            .ok_or_else(|| MarketplaceError::precondition("No active order"))?;
        let resolver = self.resolver(ctx).await?;

        let plan = validate_selections(&seller_ids(&order, &resolver), selections)?;
        let order = step(
            "set shipping method",
            self.host.set_shipping_method(ctx, plan.primary(), &plan.method_ids()),
        )
        .await?;

        tracing::debug!(order_id = %order.id, methods = plan.selections().len(), "shipping set per seller");
        Ok(order)
    }
}
