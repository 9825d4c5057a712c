//! In-memory host adapter for development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use market_commerce::channel::{Channel, ChannelRef, Seller};
use market_commerce::order::{Order, OrderLine, OrderState, Surcharge};
use market_commerce::seller::SellerResolver;
use market_commerce::shipping::{
    assign_all_shipping_lines, SellerOnlyEligibilityChecker, ShippingEligibilityChecker, ShippingLine,
    ShippingOffer, ShippingQuote, SELLER_ONLY_CHECKER_CODE,
};
use market_commerce::{
    AdministratorId, ChannelId, Currency, CustomerId, Money, OrderId, PaymentId, PaymentMethodId,
    ProductId, RoleId, SellerId, ShippingMethodId, StockLocationId, SurchargeId, TaxCategoryId,
    TaxRateId, UserId, VariantId, ZoneId,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::*;
use crate::error::INSUFFICIENT_PERMISSIONS;
use crate::payment::PaymentMethodHandler;

/// Code of the default channel.
pub const DEFAULT_CHANNEL_CODE: &str = "__default_channel__";

/// Code of the role carrying every permission.
pub const SUPER_ADMIN_ROLE_CODE: &str = "SuperAdmin";

/// Identifier of the bootstrap superadmin account.
pub const SUPERADMIN_IDENTIFIER: &str = "superadmin";

fn not_found(entity: &str, id: impl std::fmt::Display) -> BackendError {
    BackendError::with_code(
        "error.entity-with-id-not-found",
        format!("No {} with the id \"{}\" could be found", entity, id),
    )
}

fn conflict(entity: &str, field: &str, value: &str) -> BackendError {
    BackendError::with_code(
        "error.duplicate-entity",
        format!("A {} with {} \"{}\" already exists", entity, field, value),
    )
}

fn merge_metadata(mut base: serde_json::Value, extra: serde_json::Value) -> serde_json::Value {
    match (&mut base, extra) {
        (serde_json::Value::Object(existing), serde_json::Value::Object(extra)) => {
            existing.extend(extra);
            base
        }
        (_, extra) => extra,
    }
}

/// Serializable view of everything the host stores, minus orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub sellers: Vec<Seller>,
    pub channels: Vec<Channel>,
    pub zones: Vec<Zone>,
    pub roles: Vec<Role>,
    pub administrators: Vec<Administrator>,
    pub stock_locations: Vec<StockLocation>,
    pub shipping_methods: Vec<ShippingOffer>,
    pub tax_categories: Vec<TaxCategory>,
    pub tax_rates: Vec<TaxRate>,
    pub payment_methods: Vec<PaymentMethod>,
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
}

#[derive(Default)]
struct Store {
    ids: HashMap<&'static str, u64>,
    snapshot: HostSnapshot,
    users: Vec<User>,
    orders: Vec<Order>,
    active_orders: HashMap<String, OrderId>,
    payments: Vec<(OrderId, Payment)>,
}

impl Store {
    fn next_id(&mut self, kind: &'static str) -> String {
        let n = self.ids.entry(kind).or_insert(0);
        *n += 1;
        n.to_string()
    }

    fn default_channel(&self) -> HostResult<&Channel> {
        self.snapshot
            .channels
            .iter()
            .find(|c| c.code == DEFAULT_CHANNEL_CODE)
            .ok_or_else(|| BackendError::new("Default channel missing"))
    }

    fn channel_for(&self, ctx: &RequestContext) -> HostResult<&Channel> {
        match &ctx.channel_token {
            Some(token) => self
                .snapshot
                .channels
                .iter()
                .find(|c| &c.token == token)
                .ok_or_else(|| {
                    BackendError::with_code(
                        "error.channel-not-found",
                        format!("No channel with the token \"{}\" exists", token),
                    )
                }),
            None => self.default_channel(),
        }
    }

    fn resolver(&self) -> HostResult<SellerResolver> {
        Ok(SellerResolver::new(self.default_channel()?.id.clone()))
    }

    fn order(&self, id: &OrderId) -> HostResult<&Order> {
        self.orders.iter().find(|o| &o.id == id).ok_or_else(|| not_found("Order", id))
    }

    fn order_mut(&mut self, id: &OrderId) -> HostResult<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| not_found("Order", id))
    }

    fn active_order_id(&self, ctx: &RequestContext) -> Option<OrderId> {
        let key = ctx.order_key()?;
        let id = self.active_orders.get(&key)?;
        self.orders
            .iter()
            .find(|o| &o.id == id)
            .filter(|o| {
                matches!(
                    o.state,
                    OrderState::AddingItems | OrderState::ArrangingShipping | OrderState::ArrangingPayment
                )
            })
            .map(|o| o.id.clone())
    }

    fn user_has(&self, user_id: &UserId, permission: Permission) -> bool {
        let Some(user) = self.users.iter().find(|u| &u.id == user_id) else {
            return false;
        };
        self.snapshot
            .roles
            .iter()
            .filter(|r| user.role_ids.contains(&r.id))
            .any(|r| r.permissions.contains(&Permission::SuperAdmin) || r.permissions.contains(&permission))
    }

    fn add_admin_user(&mut self, identifier: &str, role_ids: Vec<RoleId>) -> UserId {
        let user_id = UserId::new(self.next_id("user"));
        self.users.push(User {
            id: user_id.clone(),
            identifier: identifier.to_string(),
            role_ids,
        });
        let admin_id = AdministratorId::new(self.next_id("administrator"));
        self.snapshot.administrators.push(Administrator {
            id: admin_id,
            user_id: user_id.clone(),
            first_name: identifier.to_string(),
            last_name: "Admin".to_string(),
            email_address: identifier.to_string(),
        });
        user_id
    }
}

/// A host that keeps everything in memory.
///
/// Boots with the default seller, the default channel and a superadmin.
/// Seller strategies run on line adds and shipping changes the way the
/// marketplace plugin configures a real host.
pub struct InMemoryHost {
    store: RwLock<Store>,
    subscribers: RwLock<Vec<Arc<dyn OrderEventSubscriber>>>,
    payment_handlers: RwLock<Vec<Arc<dyn PaymentMethodHandler>>>,
    superadmin_user_id: UserId,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHost {
    /// Create a host with the default channel and a superadmin.
    pub fn new() -> Self {
        let mut store = Store::default();

        let seller_id = SellerId::new(store.next_id("seller"));
        store.snapshot.sellers.push(Seller {
            id: seller_id.clone(),
            name: "Default Seller".to_string(),
        });

        let channel_id = ChannelId::new(store.next_id("channel"));
        store.snapshot.channels.push(Channel {
            id: channel_id.clone(),
            code: DEFAULT_CHANNEL_CODE.to_string(),
            token: "default-channel-token".to_string(),
            seller_id: Some(seller_id),
            currency: Currency::EUR,
            prices_include_tax: false,
            default_shipping_zone_id: None,
            default_tax_zone_id: None,
        });

        let role_id = RoleId::new(store.next_id("role"));
        store.snapshot.roles.push(Role {
            id: role_id.clone(),
            code: SUPER_ADMIN_ROLE_CODE.to_string(),
            description: "SuperAdmin".to_string(),
            permissions: vec![Permission::SuperAdmin],
            channel_ids: vec![channel_id],
        });
        let superadmin_user_id = store.add_admin_user(SUPERADMIN_IDENTIFIER, vec![role_id]);

        Self {
            store: RwLock::new(store),
            subscribers: RwLock::new(Vec::new()),
            payment_handlers: RwLock::new(Vec::new()),
            superadmin_user_id,
        }
    }

    /// A context acting as the bootstrap superadmin.
    pub fn superadmin_context(&self) -> RequestContext {
        RequestContext::for_user(self.superadmin_user_id.clone())
    }

    /// Register an order event subscriber.
    pub fn subscribe(&self, subscriber: Arc<dyn OrderEventSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    /// Register a payment method handler.
    pub fn register_payment_handler(&self, handler: Arc<dyn PaymentMethodHandler>) {
        self.payment_handlers.write().push(handler);
    }

    /// Add an administrator account holding `role_ids`.
    pub fn add_admin_user(&self, identifier: &str, role_ids: Vec<RoleId>) -> UserId {
        self.store.write().add_admin_user(identifier, role_ids)
    }

    /// The resolver for this host's default channel.
    pub fn resolver(&self) -> HostResult<SellerResolver> {
        self.store.read().resolver()
    }

    /// Copy of the stored catalog, channels and accounts.
    pub fn snapshot(&self) -> HostSnapshot {
        self.store.read().snapshot.clone()
    }

    fn payment_handler(&self, code: &str) -> HostResult<Arc<dyn PaymentMethodHandler>> {
        self.payment_handlers
            .read()
            .iter()
            .find(|h| h.code() == code)
            .cloned()
            .ok_or_else(|| BackendError::new(format!("No PaymentMethodHandler with code \"{}\"", code)))
    }

    fn active_order_snapshot(&self, ctx: &RequestContext) -> HostResult<Order> {
        let store = self.store.read();
        let id = store
            .active_order_id(ctx)
            .ok_or_else(|| BackendError::with_code("error.no-active-order", "No active order"))?;
        Ok(store.order(&id)?.clone())
    }
}

#[async_trait]
impl ChannelService for InMemoryHost {
    async fn default_channel(&self, _ctx: &RequestContext) -> HostResult<Channel> {
        Ok(self.store.read().default_channel()?.clone())
    }

    async fn find_channel(&self, _ctx: &RequestContext, id: &ChannelId) -> HostResult<Option<Channel>> {
        Ok(self.store.read().snapshot.channels.iter().find(|c| &c.id == id).cloned())
    }

    async fn create_channel(&self, _ctx: &RequestContext, input: CreateChannelInput) -> HostResult<Channel> {
        let mut store = self.store.write();
        if store.snapshot.channels.iter().any(|c| c.code == input.code) {
            return Err(conflict("Channel", "code", &input.code));
        }
        if let Some(seller_id) = &input.seller_id {
            if !store.snapshot.sellers.iter().any(|s| &s.id == seller_id) {
                return Err(not_found("Seller", seller_id));
            }
        }
        let channel = Channel {
            id: ChannelId::new(store.next_id("channel")),
            code: input.code,
            token: input.token,
            seller_id: input.seller_id,
            currency: input.currency,
            prices_include_tax: input.prices_include_tax,
            default_shipping_zone_id: input.default_shipping_zone_id,
            default_tax_zone_id: input.default_tax_zone_id,
        };
        store.snapshot.channels.push(channel.clone());
        Ok(channel)
    }

    async fn set_default_tax_zone(
        &self,
        _ctx: &RequestContext,
        channel_id: &ChannelId,
        zone_id: &ZoneId,
    ) -> HostResult<Channel> {
        let mut store = self.store.write();
        if !store.snapshot.zones.iter().any(|z| &z.id == zone_id) {
            return Err(not_found("Zone", zone_id));
        }
        let channel = store
            .snapshot
            .channels
            .iter_mut()
            .find(|c| &c.id == channel_id)
            .ok_or_else(|| not_found("Channel", channel_id))?;
        channel.default_tax_zone_id = Some(zone_id.clone());
        Ok(channel.clone())
    }

    async fn assign_stock_location_to_channel(
        &self,
        _ctx: &RequestContext,
        stock_location_id: &StockLocationId,
        channel_id: &ChannelId,
    ) -> HostResult<()> {
        let mut store = self.store.write();
        if !store.snapshot.channels.iter().any(|c| &c.id == channel_id) {
            return Err(not_found("Channel", channel_id));
        }
        let location = store
            .snapshot
            .stock_locations
            .iter_mut()
            .find(|l| &l.id == stock_location_id)
            .ok_or_else(|| not_found("StockLocation", stock_location_id))?;
        if !location.channel_ids.contains(channel_id) {
            location.channel_ids.push(channel_id.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl SellerService for InMemoryHost {
    async fn create_seller(&self, _ctx: &RequestContext, name: &str) -> HostResult<Seller> {
        if name.trim().is_empty() {
            return Err(BackendError::new("Seller name must not be empty"));
        }
        let mut store = self.store.write();
        let seller = Seller {
            id: SellerId::new(store.next_id("seller")),
            name: name.to_string(),
        };
        store.snapshot.sellers.push(seller.clone());
        Ok(seller)
    }
}

#[async_trait]
impl ZoneService for InMemoryHost {
    async fn find_all_zones(&self, _ctx: &RequestContext) -> HostResult<Vec<Zone>> {
        Ok(self.store.read().snapshot.zones.clone())
    }

    async fn create_zone(&self, _ctx: &RequestContext, name: &str) -> HostResult<Zone> {
        let mut store = self.store.write();
        let zone = Zone {
            id: ZoneId::new(store.next_id("zone")),
            name: name.to_string(),
        };
        store.snapshot.zones.push(zone.clone());
        Ok(zone)
    }
}

#[async_trait]
impl RoleService for InMemoryHost {
    async fn create_role(&self, ctx: &RequestContext, input: CreateRoleInput) -> HostResult<Role> {
        let mut store = self.store.write();
        if store.snapshot.roles.iter().any(|r| r.code == input.code) {
            return Err(conflict("Role", "code", &input.code));
        }
        let channel_id = store.channel_for(ctx)?.id.clone();
        let role = Role {
            id: RoleId::new(store.next_id("role")),
            code: input.code,
            description: input.description,
            permissions: input.permissions,
            channel_ids: vec![channel_id],
        };
        store.snapshot.roles.push(role.clone());
        Ok(role)
    }

    async fn find_role(&self, _ctx: &RequestContext, id: &RoleId) -> HostResult<Option<Role>> {
        Ok(self.store.read().snapshot.roles.iter().find(|r| &r.id == id).cloned())
    }

    async fn find_role_by_code(&self, _ctx: &RequestContext, code: &str) -> HostResult<Option<Role>> {
        Ok(self.store.read().snapshot.roles.iter().find(|r| r.code == code).cloned())
    }

    async fn assign_role_to_channel(
        &self,
        _ctx: &RequestContext,
        role_id: &RoleId,
        channel_id: &ChannelId,
    ) -> HostResult<Role> {
        let mut store = self.store.write();
        if !store.snapshot.channels.iter().any(|c| &c.id == channel_id) {
            return Err(not_found("Channel", channel_id));
        }
        let role = store
            .snapshot
            .roles
            .iter_mut()
            .find(|r| &r.id == role_id)
            .ok_or_else(|| not_found("Role", role_id))?;
        if !role.channel_ids.contains(channel_id) {
            role.channel_ids.push(channel_id.clone());
        }
        Ok(role.clone())
    }
}

#[async_trait]
impl AdministratorService for InMemoryHost {
    async fn find_administrator_by_user(
        &self,
        _ctx: &RequestContext,
        user_id: &UserId,
    ) -> HostResult<Option<Administrator>> {
        Ok(self
            .store
            .read()
            .snapshot
            .administrators
            .iter()
            .find(|a| &a.user_id == user_id)
            .cloned())
    }

    async fn find_user(&self, _ctx: &RequestContext, user_id: &UserId) -> HostResult<Option<User>> {
        Ok(self.store.read().users.iter().find(|u| &u.id == user_id).cloned())
    }

    async fn create_administrator(
        &self,
        ctx: &RequestContext,
        input: CreateAdministratorInput,
    ) -> HostResult<Administrator> {
        let mut store = self.store.write();
        let allowed = ctx
            .active_user_id
            .as_ref()
            .is_some_and(|u| store.user_has(u, Permission::CreateAdministrator));
        if !allowed {
            return Err(BackendError::with_code(INSUFFICIENT_PERMISSIONS, INSUFFICIENT_PERMISSIONS));
        }
        if store.users.iter().any(|u| u.identifier == input.email_address) {
            return Err(BackendError::with_code(
                "error.email-address-conflict",
                "The email address is not available.",
            ));
        }
        for role_id in &input.role_ids {
            if !store.snapshot.roles.iter().any(|r| &r.id == role_id) {
                return Err(not_found("Role", role_id));
            }
        }

        let user_id = UserId::new(store.next_id("user"));
        store.users.push(User {
            id: user_id.clone(),
            identifier: input.email_address.clone(),
            role_ids: input.role_ids,
        });
        let admin = Administrator {
            id: AdministratorId::new(store.next_id("administrator")),
            user_id,
            first_name: input.first_name,
            last_name: input.last_name,
            email_address: input.email_address,
        };
        store.snapshot.administrators.push(admin.clone());
        Ok(admin)
    }
}

#[async_trait]
impl StockLocationService for InMemoryHost {
    async fn create_stock_location(
        &self,
        ctx: &RequestContext,
        input: CreateStockLocationInput,
    ) -> HostResult<StockLocation> {
        let mut store = self.store.write();
        let channel_id = store.channel_for(ctx)?.id.clone();
        let location = StockLocation {
            id: StockLocationId::new(store.next_id("stock_location")),
            name: input.name,
            description: input.description,
            channel_ids: vec![channel_id],
        };
        store.snapshot.stock_locations.push(location.clone());
        Ok(location)
    }
}

#[async_trait]
impl ShippingMethodService for InMemoryHost {
    async fn create_shipping_method(
        &self,
        ctx: &RequestContext,
        input: CreateShippingMethodInput,
    ) -> HostResult<ShippingOffer> {
        let mut store = self.store.write();
        if store.snapshot.shipping_methods.iter().any(|m| m.code == input.code) {
            return Err(conflict("ShippingMethod", "code", &input.code));
        }
        let default = store.default_channel()?.to_ref();
        let channel = store.channel_for(ctx)?;
        let channel_ref = channel.to_ref();
        let price = Money::new(input.rate, channel.currency);

        let mut offer = ShippingOffer::new(
            ShippingMethodId::new(store.next_id("shipping_method")),
            input.code,
            input.name,
            price,
        )
        .in_channel(default)
        .in_channel(channel_ref);
        offer.description = Some(input.description);
        offer.checker_code = input.checker_code;

        store.snapshot.shipping_methods.push(offer.clone());
        Ok(offer)
    }

    async fn find_shipping_method(
        &self,
        _ctx: &RequestContext,
        id: &ShippingMethodId,
    ) -> HostResult<Option<ShippingOffer>> {
        Ok(self
            .store
            .read()
            .snapshot
            .shipping_methods
            .iter()
            .find(|m| &m.id == id)
            .cloned())
    }

    async fn assign_shipping_methods_to_channel(
        &self,
        _ctx: &RequestContext,
        channel_id: &ChannelId,
        method_ids: &[ShippingMethodId],
    ) -> HostResult<()> {
        let mut store = self.store.write();
        let channel_ref: ChannelRef = store
            .snapshot
            .channels
            .iter()
            .find(|c| &c.id == channel_id)
            .map(Channel::to_ref)
            .ok_or_else(|| not_found("Channel", channel_id))?;
        for id in method_ids {
            let method = store
                .snapshot
                .shipping_methods
                .iter_mut()
                .find(|m| &m.id == id)
                .ok_or_else(|| not_found("ShippingMethod", id))?;
            if !method.channels.contains(&channel_ref) {
                method.channels.push(channel_ref.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrderService for InMemoryHost {
    async fn active_order(&self, ctx: &RequestContext) -> HostResult<Option<Order>> {
        let store = self.store.read();
        match store.active_order_id(ctx) {
            Some(id) => Ok(Some(store.order(&id)?.clone())),
            None => Ok(None),
        }
    }

    async fn find_order(&self, _ctx: &RequestContext, id: &OrderId) -> HostResult<Option<Order>> {
        Ok(self.store.read().orders.iter().find(|o| &o.id == id).cloned())
    }

    async fn add_item_to_order(
        &self,
        ctx: &RequestContext,
        variant_id: &VariantId,
        quantity: i64,
    ) -> HostResult<Order> {
        let key = ctx
            .order_key()
            .ok_or_else(|| BackendError::new("No session to attach an order to"))?;
        let mut store = self.store.write();
        let resolver = store.resolver()?;
        let variant = store
            .snapshot
            .products
            .iter()
            .flat_map(|p| p.variants.iter())
            .find(|v| &v.id == variant_id)
            .cloned()
            .ok_or_else(|| not_found("ProductVariant", variant_id))?;

        let order_id = match store.active_order_id(ctx) {
            Some(id) => id,
            None => {
                let currency = store.channel_for(ctx)?.currency;
                let mut order = Order::new(currency);
                order.customer_user_id = ctx.active_user_id.clone();
                let id = order.id.clone();
                store.orders.push(order);
                store.active_orders.insert(key, id.clone());
                id
            }
        };

        let order = store.order_mut(&order_id)?;
        if order.state != OrderState::AddingItems {
            return Err(BackendError::with_code(
                "error.order-modification-error",
                format!("Order \"{}\" cannot be modified in state {}", order.code, order.state),
            ));
        }
        let mut line = OrderLine::new(variant.to_variant_ref(), quantity, variant.price)?;
        resolver.set_order_line_seller_channel(&mut line);
        order.add_line(line)?;
        Ok(order.clone())
    }

    async fn eligible_shipping_methods(
        &self,
        ctx: &RequestContext,
        order_id: &OrderId,
    ) -> HostResult<Vec<ShippingQuote>> {
        let store = self.store.read();
        let order = store.order(order_id)?;
        let channel_id = store.channel_for(ctx)?.id.clone();
        let checker = SellerOnlyEligibilityChecker::new(store.resolver()?);

        Ok(store
            .snapshot
            .shipping_methods
            .iter()
            .filter(|m| m.channels.iter().any(|c| c.id == channel_id))
            .filter(|m| match m.checker_code.as_deref() {
                Some(SELLER_ONLY_CHECKER_CODE) => checker.check(order, m),
                _ => true,
            })
            .map(ShippingOffer::quote)
            .collect())
    }

    async fn set_shipping_method(
        &self,
        ctx: &RequestContext,
        primary: &ShippingMethodId,
        method_ids: &[ShippingMethodId],
    ) -> HostResult<Order> {
        let mut store = self.store.write();
        let order_id = store
            .active_order_id(ctx)
            .ok_or_else(|| BackendError::with_code("error.no-active-order", "No active order"))?;
        let resolver = store.resolver()?;

        let mut ids: Vec<ShippingMethodId> = Vec::with_capacity(method_ids.len() + 1);
        for id in std::iter::once(primary).chain(method_ids) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        let lines = ids
            .iter()
            .map(|id| {
                store
                    .snapshot
                    .shipping_methods
                    .iter()
                    .find(|m| &m.id == id)
                    .cloned()
                    .map(ShippingLine::new)
                    .ok_or_else(|| not_found("ShippingMethod", id))
            })
            .collect::<HostResult<Vec<_>>>()?;

        let order = store.order_mut(&order_id)?;
        if !matches!(order.state, OrderState::AddingItems | OrderState::ArrangingShipping) {
            return Err(BackendError::with_code(
                "error.order-modification-error",
                format!("Shipping cannot be changed in state {}", order.state),
            ));
        }
        order.shipping_lines = lines;
        assign_all_shipping_lines(order, &resolver);
        order.touch();
        Ok(order.clone())
    }

    async fn add_surcharge(
        &self,
        _ctx: &RequestContext,
        order_id: &OrderId,
        input: SurchargeInput,
    ) -> HostResult<Order> {
        let mut store = self.store.write();
        let id = SurchargeId::new(store.next_id("surcharge"));
        let order = store.order_mut(order_id)?;
        order.surcharges.push(Surcharge {
            id,
            description: input.description,
            sku: input.sku,
            list_price: input.list_price,
            list_price_includes_tax: input.list_price_includes_tax,
            tax_rate: input.tax_rate,
        });
        order.touch();
        Ok(order.clone())
    }

    async fn transition_to_state(
        &self,
        ctx: &RequestContext,
        order_id: &OrderId,
        to: OrderState,
    ) -> HostResult<Order> {
        let event = {
            let mut store = self.store.write();
            let resolver = store.resolver()?;
            store.order_mut(order_id)?.transition_to(to, &resolver)?
        };

        let subscribers = self.subscribers.read().clone();
        for subscriber in subscribers {
            subscriber
                .on_state_transition(self, ctx, &event)
                .await
                .map_err(|e| BackendError::new(e.to_string()))?;
        }

        Ok(self.store.read().order(order_id)?.clone())
    }

    async fn add_payment_to_order(
        &self,
        ctx: &RequestContext,
        method_code: &str,
        metadata: serde_json::Value,
    ) -> HostResult<Order> {
        let order = self.active_order_snapshot(ctx)?;
        if order.state != OrderState::ArrangingPayment {
            return Err(BackendError::with_code(
                "error.order-payment-state-error",
                format!("A Payment may only be added when the order is in ArrangingPayment, not {}", order.state),
            ));
        }
        let handler_code = {
            let store = self.store.read();
            store
                .snapshot
                .payment_methods
                .iter()
                .find(|m| m.code == method_code && m.enabled)
                .map(|m| m.handler_code.clone())
                .ok_or_else(|| {
                    BackendError::with_code(
                        "error.ineligible-payment-method",
                        format!("Payment method \"{}\" is not available", method_code),
                    )
                })?
        };
        let handler = self.payment_handler(&handler_code)?;

        let amount = order.total()?;
        let result = handler.create_payment(ctx, &order, amount, &metadata).await?;
        let next_state = match result.state {
            PaymentState::Authorized => Some(OrderState::PaymentAuthorized),
            PaymentState::Settled => Some(OrderState::PaymentSettled),
            PaymentState::Created => None,
            PaymentState::Declined => {
                return Err(BackendError::with_code("error.payment-declined", "The payment was declined"))
            }
        };

        {
            let mut store = self.store.write();
            let payment = Payment {
                id: PaymentId::new(store.next_id("payment")),
                method_code: method_code.to_string(),
                amount: result.amount,
                state: result.state,
                transaction_id: result.transaction_id,
                metadata: result.metadata,
            };
            store.payments.push((order.id.clone(), payment));
        }

        match next_state {
            Some(state) => self.transition_to_state(ctx, &order.id, state).await,
            None => Ok(order),
        }
    }

    async fn settle_payment(&self, ctx: &RequestContext, payment_id: &PaymentId) -> HostResult<Payment> {
        let (order, payment) = {
            let store = self.store.read();
            let (order_id, payment) = store
                .payments
                .iter()
                .find(|(_, p)| &p.id == payment_id)
                .cloned()
                .ok_or_else(|| not_found("Payment", payment_id))?;
            (store.order(&order_id)?.clone(), payment)
        };
        if payment.state != PaymentState::Authorized {
            return Err(BackendError::with_code(
                "error.payment-state-transition-error",
                "Only authorized payments can be settled",
            ));
        }

        let handler = self.payment_handler(&self.handler_code_for(&payment.method_code)?)?;
        let result = handler.settle_payment(ctx, &order, &payment).await?;
        if !result.success {
            return Err(BackendError::new("Payment settlement failed"));
        }

        let settled = {
            let mut store = self.store.write();
            let (_, stored) = store
                .payments
                .iter_mut()
                .find(|(_, p)| &p.id == payment_id)
                .ok_or_else(|| not_found("Payment", payment_id))?;
            stored.state = PaymentState::Settled;
            stored.metadata = merge_metadata(std::mem::take(&mut stored.metadata), result.metadata);
            stored.clone()
        };

        if order.state == OrderState::PaymentAuthorized {
            self.transition_to_state(ctx, &order.id, OrderState::PaymentSettled).await?;
        }
        Ok(settled)
    }

    async fn payments_for_order(&self, _ctx: &RequestContext, order_id: &OrderId) -> HostResult<Vec<Payment>> {
        Ok(self
            .store
            .read()
            .payments
            .iter()
            .filter(|(id, _)| id == order_id)
            .map(|(_, p)| p.clone())
            .collect())
    }
}

impl InMemoryHost {
    fn handler_code_for(&self, method_code: &str) -> HostResult<String> {
        self.store
            .read()
            .snapshot
            .payment_methods
            .iter()
            .find(|m| m.code == method_code)
            .map(|m| m.handler_code.clone())
            .ok_or_else(|| not_found("PaymentMethod", method_code))
    }
}

#[async_trait]
impl CatalogService for InMemoryHost {
    async fn product_count(&self, _ctx: &RequestContext) -> HostResult<usize> {
        Ok(self.store.read().snapshot.products.len())
    }

    async fn create_product(&self, ctx: &RequestContext, input: CreateProductInput) -> HostResult<Product> {
        let mut store = self.store.write();
        if store.snapshot.products.iter().any(|p| p.slug == input.slug) {
            return Err(conflict("Product", "slug", &input.slug));
        }
        let default = store.default_channel()?.to_ref();
        let channel = store.channel_for(ctx)?;
        let currency = channel.currency;
        let mut channels = vec![default];
        if !channels.contains(&channel.to_ref()) {
            channels.push(channel.to_ref());
        }

        let product_id = ProductId::new(store.next_id("product"));
        let mut variants = Vec::with_capacity(input.variants.len());
        for v in input.variants {
            if store.snapshot.products.iter().flat_map(|p| &p.variants).any(|e| e.sku == v.sku) {
                return Err(conflict("ProductVariant", "sku", &v.sku));
            }
            variants.push(ProductVariant {
                id: VariantId::new(store.next_id("variant")),
                product_id: product_id.clone(),
                sku: v.sku,
                name: v.name,
                price: Money::new(v.price, currency),
                stock_on_hand: v.stock_on_hand,
                tax_category_id: v.tax_category_id,
                channels: channels.clone(),
            });
        }

        let product = Product {
            id: product_id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            variants,
        };
        store.snapshot.products.push(product.clone());
        Ok(product)
    }
}

#[async_trait]
impl TaxService for InMemoryHost {
    async fn find_all_tax_categories(&self, _ctx: &RequestContext) -> HostResult<Vec<TaxCategory>> {
        Ok(self.store.read().snapshot.tax_categories.clone())
    }

    async fn create_tax_category(&self, _ctx: &RequestContext, name: &str) -> HostResult<TaxCategory> {
        let mut store = self.store.write();
        let category = TaxCategory {
            id: TaxCategoryId::new(store.next_id("tax_category")),
            name: name.to_string(),
        };
        store.snapshot.tax_categories.push(category.clone());
        Ok(category)
    }

    async fn find_all_tax_rates(&self, _ctx: &RequestContext) -> HostResult<Vec<TaxRate>> {
        Ok(self.store.read().snapshot.tax_rates.clone())
    }

    async fn create_tax_rate(&self, _ctx: &RequestContext, input: CreateTaxRateInput) -> HostResult<TaxRate> {
        let mut store = self.store.write();
        if !store.snapshot.zones.iter().any(|z| z.id == input.zone_id) {
            return Err(not_found("Zone", &input.zone_id));
        }
        if !store.snapshot.tax_categories.iter().any(|c| c.id == input.category_id) {
            return Err(not_found("TaxCategory", &input.category_id));
        }
        let rate = TaxRate {
            id: TaxRateId::new(store.next_id("tax_rate")),
            name: input.name,
            enabled: input.enabled,
            value: input.value,
            zone_id: input.zone_id,
            category_id: input.category_id,
        };
        store.snapshot.tax_rates.push(rate.clone());
        Ok(rate)
    }
}

#[async_trait]
impl PaymentMethodService for InMemoryHost {
    async fn find_all_payment_methods(&self, _ctx: &RequestContext) -> HostResult<Vec<PaymentMethod>> {
        Ok(self.store.read().snapshot.payment_methods.clone())
    }

    async fn create_payment_method(
        &self,
        _ctx: &RequestContext,
        input: CreatePaymentMethodInput,
    ) -> HostResult<PaymentMethod> {
        let mut store = self.store.write();
        if store.snapshot.payment_methods.iter().any(|m| m.code == input.code) {
            return Err(conflict("PaymentMethod", "code", &input.code));
        }
        let method = PaymentMethod {
            id: PaymentMethodId::new(store.next_id("payment_method")),
            code: input.code,
            name: input.name,
            description: input.description,
            handler_code: input.handler_code,
            enabled: input.enabled,
        };
        store.snapshot.payment_methods.push(method.clone());
        Ok(method)
    }
}

#[async_trait]
impl CustomerService for InMemoryHost {
    async fn find_customer_by_email(&self, _ctx: &RequestContext, email: &str) -> HostResult<Option<Customer>> {
        Ok(self
            .store
            .read()
            .snapshot
            .customers
            .iter()
            .find(|c| c.email_address.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_customer(&self, _ctx: &RequestContext, input: CreateCustomerInput) -> HostResult<Customer> {
        let mut store = self.store.write();
        if store
            .snapshot
            .customers
            .iter()
            .any(|c| c.email_address.eq_ignore_ascii_case(&input.email_address))
        {
            return Err(BackendError::with_code(
                "error.email-address-conflict",
                "The email address is not available.",
            ));
        }
        let customer = Customer {
            id: CustomerId::new(store.next_id("customer")),
            email_address: input.email_address,
            first_name: input.first_name,
            last_name: input.last_name,
            phone_number: input.phone_number,
        };
        store.snapshot.customers.push(customer.clone());
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::ManualPaymentHandler;

    async fn seller_setup(host: &InMemoryHost) -> (Channel, VariantId, ShippingOffer) {
        let ctx = host.superadmin_context();
        let seller = host.create_seller(&ctx, "Seller A").await.unwrap();
        let channel = host
            .create_channel(
                &ctx,
                CreateChannelInput {
                    code: "seller-a".to_string(),
                    token: "seller-a-token".to_string(),
                    seller_id: Some(seller.id),
                    currency: Currency::EUR,
                    prices_include_tax: false,
                    default_shipping_zone_id: None,
                    default_tax_zone_id: None,
                },
            )
            .await
            .unwrap();
        let seller_ctx = ctx.clone().with_channel_token("seller-a-token");
        let method = host
            .create_shipping_method(
                &seller_ctx,
                CreateShippingMethodInput {
                    code: "seller-a-std".to_string(),
                    name: "Seller A Standard".to_string(),
                    description: "Seller A shipping".to_string(),
                    checker_code: Some(SELLER_ONLY_CHECKER_CODE.to_string()),
                    rate: 800,
                    rate_includes_tax: false,
                    fulfillment_handler: "manual-fulfillment".to_string(),
                },
            )
            .await
            .unwrap();
        let product = host
            .create_product(
                &seller_ctx,
                CreateProductInput {
                    name: "Halloumi Cheese 250g".to_string(),
                    slug: "halloumi-250".to_string(),
                    description: String::new(),
                    variants: vec![CreateVariantInput {
                        sku: "A-HALL-250".to_string(),
                        name: "250g".to_string(),
                        price: 599,
                        stock_on_hand: 100,
                        tax_category_id: None,
                    }],
                },
            )
            .await
            .unwrap();
        (channel, product.variants[0].id.clone(), method)
    }

    #[tokio::test]
    async fn test_bootstrap() {
        let host = InMemoryHost::new();
        let ctx = host.superadmin_context();
        let channel = host.default_channel(&ctx).await.unwrap();
        assert_eq!(channel.code, DEFAULT_CHANNEL_CODE);
        assert!(host.find_role_by_code(&ctx, SUPER_ADMIN_ROLE_CODE).await.unwrap().is_some());
        let admin = host
            .find_administrator_by_user(&ctx, ctx.active_user_id.as_ref().unwrap())
            .await
            .unwrap();
        assert!(admin.is_some());
    }

    #[tokio::test]
    async fn test_add_item_tags_seller() {
        let host = InMemoryHost::new();
        let (channel, variant_id, _) = seller_setup(&host).await;
        let shopper = RequestContext::anonymous().with_session("s1");

        let order = host.add_item_to_order(&shopper, &variant_id, 2).await.unwrap();
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].seller_channel_id.as_ref(), Some(&channel.id));
        assert_eq!(order.sub_total().unwrap().amount_minor, 1198);

        let again = host.active_order(&shopper).await.unwrap().unwrap();
        assert_eq!(again.id, order.id);
        assert!(host.active_order(&RequestContext::anonymous().with_session("s2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_eligible_methods_filtered_by_checker() {
        let host = InMemoryHost::new();
        let (_, variant_id, method) = seller_setup(&host).await;
        let shopper = RequestContext::anonymous().with_session("s1");
        let order = host.add_item_to_order(&shopper, &variant_id, 1).await.unwrap();

        let quotes = host.eligible_shipping_methods(&shopper, &order.id).await.unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].id, method.id);
    }

    #[tokio::test]
    async fn test_create_administrator_requires_permission() {
        let host = InMemoryHost::new();
        let ctx = host.superadmin_context();
        let weak_role = host
            .create_role(
                &ctx,
                CreateRoleInput {
                    code: "viewer".to_string(),
                    description: "Viewer".to_string(),
                    permissions: vec![Permission::ReadCatalog],
                },
            )
            .await
            .unwrap();
        let viewer = host.add_admin_user("viewer@example.com", vec![weak_role.id.clone()]);

        let input = CreateAdministratorInput {
            first_name: "A".to_string(),
            last_name: "Admin".to_string(),
            email_address: "a@example.com".to_string(),
            password: "pw".to_string(),
            role_ids: vec![weak_role.id],
        };
        let err = host
            .create_administrator(&RequestContext::for_user(viewer), input.clone())
            .await
            .unwrap_err();
        assert!(err.is(INSUFFICIENT_PERMISSIONS));

        host.create_administrator(&ctx, input.clone()).await.unwrap();
        let err = host.create_administrator(&ctx, input).await.unwrap_err();
        assert_eq!(err.code.as_deref(), Some("error.email-address-conflict"));
    }

    #[tokio::test]
    async fn test_payment_flow() {
        let host = InMemoryHost::new();
        host.register_payment_handler(Arc::new(ManualPaymentHandler));
        let ctx = host.superadmin_context();
        host.create_payment_method(
            &ctx,
            CreatePaymentMethodInput {
                code: "manual".to_string(),
                name: "Manual Payment".to_string(),
                description: String::new(),
                handler_code: "manual".to_string(),
                enabled: true,
            },
        )
        .await
        .unwrap();

        let (_, variant_id, method) = seller_setup(&host).await;
        let shopper = RequestContext::anonymous().with_session("s1");
        let order = host.add_item_to_order(&shopper, &variant_id, 1).await.unwrap();
        host.set_shipping_method(&shopper, &method.id, &[method.id.clone()]).await.unwrap();
        host.transition_to_state(&shopper, &order.id, OrderState::ArrangingShipping).await.unwrap();
        host.transition_to_state(&shopper, &order.id, OrderState::ArrangingPayment).await.unwrap();

        let paid = host
            .add_payment_to_order(&shopper, "manual", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(paid.state, OrderState::PaymentAuthorized);

        let payments = host.payments_for_order(&shopper, &order.id).await.unwrap();
        assert_eq!(payments[0].amount.amount_minor, 599 + 800);
        assert_eq!(payments[0].transaction_id, "manual-auth");

        let settled = host.settle_payment(&shopper, &payments[0].id).await.unwrap();
        assert_eq!(settled.state, PaymentState::Settled);
        let order = host.find_order(&shopper, &order.id).await.unwrap().unwrap();
        assert_eq!(order.state, OrderState::PaymentSettled);
    }

    #[tokio::test]
    async fn test_unknown_channel_token() {
        let host = InMemoryHost::new();
        let ctx = RequestContext::anonymous().with_channel_token("nope");
        let err = host.create_stock_location(
            &ctx,
            CreateStockLocationInput {
                name: "X".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("error.channel-not-found"));
    }
}
