//! Channel and seller types.

use crate::ids::{ChannelId, SellerId, ZoneId};
use crate::money::Currency;
use serde::{Deserialize, Serialize};

/// A vendor registered on the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
}

/// A seller scope: an isolated partition of catalog, shipping and stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    /// Unique channel identifier.
    pub id: ChannelId,
    /// Machine-readable code (e.g., "seller-3").
    pub code: String,
    /// Token clients send to act within this channel.
    pub token: String,
    /// Owning seller, if any.
    pub seller_id: Option<SellerId>,
    /// Default currency for prices in this channel.
    pub currency: Currency,
    /// Whether prices are entered including tax.
    pub prices_include_tax: bool,
    /// Default shipping zone.
    pub default_shipping_zone_id: Option<ZoneId>,
    /// Default tax zone.
    pub default_tax_zone_id: Option<ZoneId>,
}

impl Channel {
    /// Get a lightweight reference for attaching to catalog entries.
    pub fn to_ref(&self) -> ChannelRef {
        ChannelRef {
            id: self.id.clone(),
            seller_id: self.seller_id.clone(),
        }
    }
}

/// The part of a channel that catalog entries carry around once hydrated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub seller_id: Option<SellerId>,
}

impl ChannelRef {
    pub fn new(id: impl Into<ChannelId>, seller_id: Option<SellerId>) -> Self {
        Self {
            id: id.into(),
            seller_id,
        }
    }

    /// A channel owned by the given seller.
    pub fn seller(id: impl Into<ChannelId>, seller_id: impl Into<SellerId>) -> Self {
        Self::new(id, Some(seller_id.into()))
    }
}
