//! Shipping module.
//!
//! Offers and quotes, per-seller eligibility, shipping-line assignment and
//! the selection gate.

mod assignment;
mod eligibility;
mod offer;
mod selection;

pub use assignment::{assign_all_shipping_lines, assign_shipping_line};
pub use eligibility::{
    is_eligible, SellerOnlyEligibilityChecker, ShippingEligibilityChecker, SELLER_ONLY_CHECKER_CODE,
};
pub use offer::{ShippingLine, ShippingOffer, ShippingQuote};
pub use selection::{
    ensure_shipping_complete, validate_selections, SellerShippingSelection, ShippingPlan,
};
