//! Seller scopes.
//!
//! Every seller owns one channel; catalog entries and shipping methods are
//! attached to one or more channels. The platform's default channel is the
//! fallback owner for anything no seller claims.

mod channel;

pub use channel::{Channel, ChannelRef, Seller};
