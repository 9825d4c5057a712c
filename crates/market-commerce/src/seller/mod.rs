//! Seller module.
//!
//! Resolves line and offer ownership, partitions orders per seller and
//! computes the platform fee.

mod fee;
mod partition;
mod resolve;

pub use fee::{
    apply_platform_fees, compute_fee, fee_sku, pending_fee_charges, FeeCharge, PLATFORM_FEE_BPS,
    PLATFORM_FEE_DESCRIPTION, PLATFORM_FEE_SKU_PREFIX,
};
pub use partition::{partition, seller_ids, split_order, SellerSubOrder};
pub use resolve::SellerResolver;
