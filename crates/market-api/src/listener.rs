//! Order lifecycle listeners.

use async_trait::async_trait;
use market_commerce::order::{OrderState, OrderStateTransitionEvent};
use market_commerce::seller::{pending_fee_charges, SellerResolver};

use crate::context::RequestContext;
use crate::error::{step, MarketplaceError};
use crate::host::{OrderEventSubscriber, OrderService};

/// Adds one platform-fee surcharge per seller when an order enters
/// `ArrangingPayment`.
///
/// Charges already on the order are skipped, so re-entering the state
/// never duplicates a fee.
#[derive(Debug, Clone)]
pub struct PlatformFeeListener {
    resolver: SellerResolver,
}

impl PlatformFeeListener {
    pub fn new(resolver: SellerResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl OrderEventSubscriber for PlatformFeeListener {
    async fn on_state_transition(
        &self,
        orders: &dyn OrderService,
        ctx: &RequestContext,
        event: &OrderStateTransitionEvent,
    ) -> Result<(), MarketplaceError> {
        if event.to_state != OrderState::ArrangingPayment {
            return Ok(());
        }

        let order = step("load order", orders.find_order(ctx, &event.order_id))
            .await?
            .ok_or_else(|| MarketplaceError::step("load order", format!("Order {} not found", event.order_id)))?;

        for charge in pending_fee_charges(&order, &self.resolver)? {
            tracing::info!(
                order_id = %order.id,
                seller_channel_id = %charge.seller_channel_id,
                fee = charge.list_price.amount_minor,
                "adding platform fee"
            );
            step("add platform fee", orders.add_surcharge(ctx, &order.id, charge.into())).await?;
        }
        Ok(())
    }
}
