//! Marketplace operations over host commerce services.
//!
//! This crate provides:
//! - Host service traits and an in-memory host for development
//! - `Marketplace` - `registerSeller`, `eligibleMethodsBySeller`, `setShippingPerSeller`
//! - `PlatformFeeListener` - per-seller fee surcharges on `ArrangingPayment`
//! - `ManualPaymentHandler` - development payments
//! - `seed` - demo sellers, catalog and customers

mod context;
mod error;
pub mod host;
mod listener;
mod marketplace;
mod payment;
mod schema;
mod seed;

pub use context::*;
pub use error::*;
pub use listener::*;
pub use marketplace::*;
pub use payment::*;
pub use schema::*;
pub use seed::*;
