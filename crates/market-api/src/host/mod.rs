//! Host service contracts.
//!
//! The commerce substrate owns persistence, catalog and order state. The
//! marketplace only reaches it through these traits.

mod memory;
mod types;

pub use memory::{HostSnapshot, InMemoryHost, DEFAULT_CHANNEL_CODE, SUPERADMIN_IDENTIFIER, SUPER_ADMIN_ROLE_CODE};
pub use types::*;

use async_trait::async_trait;
use market_commerce::channel::{Channel, Seller};
use market_commerce::order::{Order, OrderState, OrderStateTransitionEvent};
use market_commerce::shipping::{ShippingOffer, ShippingQuote};
use market_commerce::{ChannelId, OrderId, PaymentId, RoleId, ShippingMethodId, StockLocationId, UserId, VariantId, ZoneId};

use crate::context::RequestContext;
use crate::error::{BackendError, MarketplaceError};

/// Result type for host calls.
pub type HostResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait ChannelService: Send + Sync {
    /// The default channel, owned by the default seller.
    async fn default_channel(&self, ctx: &RequestContext) -> HostResult<Channel>;

    async fn find_channel(&self, ctx: &RequestContext, id: &ChannelId) -> HostResult<Option<Channel>>;

    async fn create_channel(&self, ctx: &RequestContext, input: CreateChannelInput) -> HostResult<Channel>;

    async fn set_default_tax_zone(
        &self,
        ctx: &RequestContext,
        channel_id: &ChannelId,
        zone_id: &ZoneId,
    ) -> HostResult<Channel>;

    async fn assign_stock_location_to_channel(
        &self,
        ctx: &RequestContext,
        stock_location_id: &StockLocationId,
        channel_id: &ChannelId,
    ) -> HostResult<()>;
}

#[async_trait]
pub trait SellerService: Send + Sync {
    async fn create_seller(&self, ctx: &RequestContext, name: &str) -> HostResult<Seller>;
}

#[async_trait]
pub trait ZoneService: Send + Sync {
    async fn find_all_zones(&self, ctx: &RequestContext) -> HostResult<Vec<Zone>>;

    async fn create_zone(&self, ctx: &RequestContext, name: &str) -> HostResult<Zone>;
}

#[async_trait]
pub trait RoleService: Send + Sync {
    async fn create_role(&self, ctx: &RequestContext, input: CreateRoleInput) -> HostResult<Role>;

    async fn find_role(&self, ctx: &RequestContext, id: &RoleId) -> HostResult<Option<Role>>;

    async fn find_role_by_code(&self, ctx: &RequestContext, code: &str) -> HostResult<Option<Role>>;

    async fn assign_role_to_channel(
        &self,
        ctx: &RequestContext,
        role_id: &RoleId,
        channel_id: &ChannelId,
    ) -> HostResult<Role>;
}

#[async_trait]
pub trait AdministratorService: Send + Sync {
    async fn find_administrator_by_user(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
    ) -> HostResult<Option<Administrator>>;

    /// Load a user together with its roles.
    async fn find_user(&self, ctx: &RequestContext, user_id: &UserId) -> HostResult<Option<User>>;

    async fn create_administrator(
        &self,
        ctx: &RequestContext,
        input: CreateAdministratorInput,
    ) -> HostResult<Administrator>;
}

#[async_trait]
pub trait StockLocationService: Send + Sync {
    async fn create_stock_location(
        &self,
        ctx: &RequestContext,
        input: CreateStockLocationInput,
    ) -> HostResult<StockLocation>;
}

#[async_trait]
pub trait ShippingMethodService: Send + Sync {
    /// Create a method in the context's channel.
    async fn create_shipping_method(
        &self,
        ctx: &RequestContext,
        input: CreateShippingMethodInput,
    ) -> HostResult<ShippingOffer>;

    async fn find_shipping_method(
        &self,
        ctx: &RequestContext,
        id: &ShippingMethodId,
    ) -> HostResult<Option<ShippingOffer>>;

    async fn assign_shipping_methods_to_channel(
        &self,
        ctx: &RequestContext,
        channel_id: &ChannelId,
        method_ids: &[ShippingMethodId],
    ) -> HostResult<()>;
}

#[async_trait]
pub trait OrderService: Send + Sync {
    /// The caller's active order, if any.
    async fn active_order(&self, ctx: &RequestContext) -> HostResult<Option<Order>>;

    async fn find_order(&self, ctx: &RequestContext, id: &OrderId) -> HostResult<Option<Order>>;

    /// Add a variant to the caller's active order, creating it when needed.
    async fn add_item_to_order(
        &self,
        ctx: &RequestContext,
        variant_id: &VariantId,
        quantity: i64,
    ) -> HostResult<Order>;

    /// Priced shipping options the host deems eligible for the order.
    async fn eligible_shipping_methods(
        &self,
        ctx: &RequestContext,
        order_id: &OrderId,
    ) -> HostResult<Vec<ShippingQuote>>;

    /// Replace the active order's shipping lines with `method_ids`.
    async fn set_shipping_method(
        &self,
        ctx: &RequestContext,
        primary: &ShippingMethodId,
        method_ids: &[ShippingMethodId],
    ) -> HostResult<Order>;

    async fn add_surcharge(
        &self,
        ctx: &RequestContext,
        order_id: &OrderId,
        input: SurchargeInput,
    ) -> HostResult<Order>;

    /// Transition the order and notify subscribers.
    async fn transition_to_state(
        &self,
        ctx: &RequestContext,
        order_id: &OrderId,
        to: OrderState,
    ) -> HostResult<Order>;

    /// Pay for the active order with the named payment method.
    async fn add_payment_to_order(
        &self,
        ctx: &RequestContext,
        method_code: &str,
        metadata: serde_json::Value,
    ) -> HostResult<Order>;

    async fn settle_payment(&self, ctx: &RequestContext, payment_id: &PaymentId) -> HostResult<Payment>;

    async fn payments_for_order(&self, ctx: &RequestContext, order_id: &OrderId) -> HostResult<Vec<Payment>>;
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn product_count(&self, ctx: &RequestContext) -> HostResult<usize>;

    /// Create a product and its variants in the context's channel.
    async fn create_product(&self, ctx: &RequestContext, input: CreateProductInput) -> HostResult<Product>;
}

#[async_trait]
pub trait TaxService: Send + Sync {
    async fn find_all_tax_categories(&self, ctx: &RequestContext) -> HostResult<Vec<TaxCategory>>;

    async fn create_tax_category(&self, ctx: &RequestContext, name: &str) -> HostResult<TaxCategory>;

    async fn find_all_tax_rates(&self, ctx: &RequestContext) -> HostResult<Vec<TaxRate>>;

    async fn create_tax_rate(&self, ctx: &RequestContext, input: CreateTaxRateInput) -> HostResult<TaxRate>;
}

#[async_trait]
pub trait PaymentMethodService: Send + Sync {
    async fn find_all_payment_methods(&self, ctx: &RequestContext) -> HostResult<Vec<PaymentMethod>>;

    async fn create_payment_method(
        &self,
        ctx: &RequestContext,
        input: CreatePaymentMethodInput,
    ) -> HostResult<PaymentMethod>;
}

#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn find_customer_by_email(&self, ctx: &RequestContext, email: &str) -> HostResult<Option<Customer>>;

    async fn create_customer(&self, ctx: &RequestContext, input: CreateCustomerInput) -> HostResult<Customer>;
}

/// Receives order lifecycle events from the host.
///
/// Handlers run inside the transition call; an error fails the call.
#[async_trait]
pub trait OrderEventSubscriber: Send + Sync {
    async fn on_state_transition(
        &self,
        orders: &dyn OrderService,
        ctx: &RequestContext,
        event: &OrderStateTransitionEvent,
    ) -> Result<(), MarketplaceError>;
}

/// Every host service the marketplace uses.
pub trait Host:
    ChannelService
    + SellerService
    + ZoneService
    + RoleService
    + AdministratorService
    + StockLocationService
    + ShippingMethodService
    + OrderService
    + CatalogService
    + TaxService
    + PaymentMethodService
    + CustomerService
{
}

impl<T> Host for T where
    T: ChannelService
        + SellerService
        + ZoneService
        + RoleService
        + AdministratorService
        + StockLocationService
        + ShippingMethodService
        + OrderService
        + CatalogService
        + TaxService
        + PaymentMethodService
        + CustomerService
{
}
