//! Order module.
//!
//! Contains order, line and surcharge types plus the lifecycle state machine.

mod order;
mod state;

pub use order::{Order, OrderLine, Surcharge, VariantRef};
pub use state::{OrderState, OrderStateTransitionEvent};
