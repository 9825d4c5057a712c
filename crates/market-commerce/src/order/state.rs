//! Order lifecycle state machine.

use crate::error::CommerceError;
use crate::ids::OrderId;
use crate::order::order::current_timestamp;
use crate::order::Order;
use crate::seller::{partition, SellerResolver};
use crate::shipping::ensure_shipping_complete;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle states, named as the host names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderState {
    /// Open: items can be added or removed.
    #[default]
    AddingItems,
    /// Customer is choosing shipping.
    ArrangingShipping,
    /// Shipping is fixed; payment is being arranged.
    ArrangingPayment,
    /// Payment authorized, not yet captured.
    PaymentAuthorized,
    /// Payment settled.
    PaymentSettled,
    /// Order cancelled.
    Cancelled,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::AddingItems => "AddingItems",
            OrderState::ArrangingShipping => "ArrangingShipping",
            OrderState::ArrangingPayment => "ArrangingPayment",
            OrderState::PaymentAuthorized => "PaymentAuthorized",
            OrderState::PaymentSettled => "PaymentSettled",
            OrderState::Cancelled => "Cancelled",
        }
    }

    /// Parse a host state name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "AddingItems" => Some(OrderState::AddingItems),
            "ArrangingShipping" => Some(OrderState::ArrangingShipping),
            "ArrangingPayment" => Some(OrderState::ArrangingPayment),
            "PaymentAuthorized" => Some(OrderState::PaymentAuthorized),
            "PaymentSettled" => Some(OrderState::PaymentSettled),
            "Cancelled" => Some(OrderState::Cancelled),
            _ => None,
        }
    }

    /// Check if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::PaymentSettled | OrderState::Cancelled)
    }

    /// Whether a direct transition to `next` is allowed.
    pub fn can_transition_to(&self, next: OrderState) -> bool {
        use OrderState::*;
        match (self, next) {
            (from, Cancelled) => !from.is_terminal(),
            (AddingItems, ArrangingShipping) => true,
            (ArrangingShipping, AddingItems | ArrangingPayment) => true,
            (ArrangingPayment, AddingItems | ArrangingShipping) => true,
            (ArrangingPayment, PaymentAuthorized | PaymentSettled) => true,
            (PaymentAuthorized, PaymentSettled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted after an order changed state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderStateTransitionEvent {
    pub order_id: OrderId,
    pub from_state: OrderState,
    pub to_state: OrderState,
}

impl Order {
    /// Move the order to `to`, enforcing the lifecycle guards.
    ///
    /// Entering `ArrangingShipping` needs at least one line. Entering
    /// `ArrangingPayment` needs exactly one shipping line per seller.
    pub fn transition_to(
        &mut self,
        to: OrderState,
        resolver: &SellerResolver,
    ) -> Result<OrderStateTransitionEvent, CommerceError> {
        let from = self.state;
        if !from.can_transition_to(to) {
            return Err(CommerceError::InvalidTransition { from, to });
        }

        match to {
            OrderState::ArrangingShipping if self.lines.is_empty() => {
                return Err(CommerceError::EmptyOrder(self.code.clone()));
            }
            OrderState::ArrangingPayment => {
                if self.lines.is_empty() {
                    return Err(CommerceError::EmptyOrder(self.code.clone()));
                }
                ensure_shipping_complete(&partition(self, resolver))?;
            }
            _ => {}
        }

        self.state = to;
        self.updated_at = current_timestamp();
        tracing::debug!(order = %self.code, %from, %to, "order state changed");

        Ok(OrderStateTransitionEvent {
            order_id: self.id.clone(),
            from_state: from,
            to_state: to,
        })
    }
}
