//! Marketplace domain types and logic.
//!
//! This crate holds everything about a multi-vendor order that can be
//! decided without talking to the host platform:
//!
//! - **Seller**: line and offer ownership, per-seller partitioning, platform fee
//! - **Shipping**: offers, eligibility, shipping-line assignment, selection gate
//! - **Order**: orders, lines, surcharges and the lifecycle state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use market_commerce::prelude::*;
//!
//! let resolver = SellerResolver::new("1");
//! for sub_order in partition(&order, &resolver) {
//!     let fee = sub_order.platform_fee()?;
//!     println!("{}: {}", sub_order.seller_channel_id, fee.display());
//! }
//! ```

pub mod channel;
pub mod error;
pub mod ids;
pub mod money;
pub mod order;
pub mod seller;
pub mod shipping;

pub use error::{CommerceError, SelectionError};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, SelectionError};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::channel::{Channel, ChannelRef, Seller};

    pub use crate::order::{
        Order, OrderLine, OrderState, OrderStateTransitionEvent, Surcharge, VariantRef,
    };

    pub use crate::seller::{
        apply_platform_fees, compute_fee, fee_sku, partition, pending_fee_charges, seller_ids,
        split_order, FeeCharge, SellerResolver, SellerSubOrder, PLATFORM_FEE_BPS,
        PLATFORM_FEE_DESCRIPTION,
    };

    pub use crate::shipping::{
        assign_all_shipping_lines, assign_shipping_line, ensure_shipping_complete, is_eligible,
        validate_selections, SellerOnlyEligibilityChecker, SellerShippingSelection,
        ShippingEligibilityChecker, ShippingLine, ShippingOffer, ShippingPlan, ShippingQuote,
        SELLER_ONLY_CHECKER_CODE,
    };
}
