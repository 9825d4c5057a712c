//! Seller resolution for order lines and shipping offers.

use crate::channel::ChannelRef;
use crate::ids::ChannelId;
use crate::order::OrderLine;
use crate::shipping::ShippingOffer;
use serde::{Deserialize, Serialize};

/// Resolves which seller scope owns a line or an offer.
///
/// Built once per request from the host's default channel and passed to
/// every strategy that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerResolver {
    default_channel_id: ChannelId,
}

impl SellerResolver {
    pub fn new(default_channel_id: impl Into<ChannelId>) -> Self {
        Self {
            default_channel_id: default_channel_id.into(),
        }
    }

    /// The default seller scope.
    pub fn default_channel_id(&self) -> &ChannelId {
        &self.default_channel_id
    }

    /// Whether `id` is the default seller scope.
    pub fn is_default(&self, id: &ChannelId) -> bool {
        id == &self.default_channel_id
    }

    /// The seller-owned, non-default scope among `channels`.
    ///
    /// Several candidates are broken by the lowest identifier in natural order.
    pub fn seller_scope<'a>(&self, channels: &'a [ChannelRef]) -> Option<&'a ChannelId> {
        channels
            .iter()
            .filter(|c| c.seller_id.is_some() && !self.is_default(&c.id))
            .map(|c| &c.id)
            .min_by(|a, b| a.natural_cmp(b))
    }

    /// Resolve the seller scope of a line. Never fails.
    ///
    /// An explicit tag wins, then the variant's seller scope, then the
    /// default scope.
    pub fn resolve(&self, line: &OrderLine) -> ChannelId {
        if let Some(tag) = &line.seller_channel_id {
            return tag.clone();
        }
        self.seller_scope(&line.variant.channels)
            .cloned()
            .unwrap_or_else(|| self.default_channel_id.clone())
    }

    /// Owning seller scope of a shipping offer.
    ///
    /// An offer attached only to the default scope belongs to the default
    /// seller. An offer attached to no scope has no owner.
    pub fn offer_owner(&self, offer: &ShippingOffer) -> Option<ChannelId> {
        if let Some(scope) = self.seller_scope(&offer.channels) {
            return Some(scope.clone());
        }
        offer
            .channels
            .iter()
            .find(|c| self.is_default(&c.id))
            .map(|c| c.id.clone())
    }

    /// Tag a line with its resolved seller scope and return it.
    pub fn set_order_line_seller_channel(&self, line: &mut OrderLine) -> ChannelId {
        let resolved = self.resolve(line);
        line.seller_channel_id = Some(resolved.clone());
        resolved
    }
}
