//! Commerce error types.

use crate::ids::ChannelId;
use crate::order::OrderState;
use thiserror::Error;

/// Errors raised while selecting shipping per seller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// A seller with lines in the order has no shipping method chosen.
    #[error("Missing shipping selection for seller channel {0}")]
    MissingSelection(ChannelId),

    /// A seller has more than one shipping line attached.
    #[error("Seller channel {seller_channel_id} has {count} shipping lines, expected exactly one")]
    AmbiguousSelection {
        seller_channel_id: ChannelId,
        count: usize,
    },

    /// No shipping method id was supplied at all.
    #[error("No shippingMethodId provided")]
    NoShippingMethod,
}

/// Errors that can occur in marketplace order operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// The order has no lines.
    #[error("Order {0} has no lines")]
    EmptyOrder(String),

    /// Invalid lifecycle transition.
    #[error("Invalid order transition from {from} to {to}")]
    InvalidTransition { from: OrderState, to: OrderState },

    /// Shipping selection problem.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,
}
