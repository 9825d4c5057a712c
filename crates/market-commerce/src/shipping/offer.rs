//! Shipping method and quote types.

use crate::channel::ChannelRef;
use crate::ids::{OrderLineId, ShippingLineId, ShippingMethodId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A shipping method as a seller offers it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingOffer {
    /// Unique identifier.
    pub id: ShippingMethodId,
    /// Machine-readable code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Flat rate before tax.
    pub price: Money,
    /// Flat rate including tax.
    pub price_with_tax: Money,
    /// Channels the method is assigned to.
    pub channels: Vec<ChannelRef>,
    /// Code of the eligibility checker the host runs for this method.
    pub checker_code: Option<String>,
}

impl ShippingOffer {
    /// Create a new shipping offer with a tax-free flat rate.
    pub fn new(
        id: impl Into<ShippingMethodId>,
        code: impl Into<String>,
        name: impl Into<String>,
        price: Money,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            description: None,
            price,
            price_with_tax: price,
            channels: Vec::new(),
            checker_code: None,
        }
    }

    /// Attach the offer to a channel.
    pub fn in_channel(mut self, channel: ChannelRef) -> Self {
        if !self.channels.contains(&channel) {
            self.channels.push(channel);
        }
        self
    }

    /// Check if this is free shipping.
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }

    /// Price this offer as a quote.
    pub fn quote(&self) -> ShippingQuote {
        ShippingQuote {
            id: self.id.clone(),
            code: self.code.clone(),
            name: self.name.clone(),
            price: self.price,
            price_with_tax: self.price_with_tax,
            metadata: None,
        }
    }
}

/// A priced, order-specific shipping option returned by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingQuote {
    pub id: ShippingMethodId,
    pub code: String,
    pub name: String,
    pub price: Money,
    pub price_with_tax: Money,
    /// Calculator metadata; may name a `sellerChannelId`.
    pub metadata: Option<serde_json::Value>,
}

impl ShippingQuote {
    /// Seller channel named in the calculator metadata, if any.
    pub fn metadata_seller_channel(&self) -> Option<&str> {
        let meta = self.metadata.as_ref()?;
        meta.get("sellerChannelId")
            .or_else(|| meta.get("channelId"))
            .and_then(|v| v.as_str())
    }
}

/// A shipping method attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingLine {
    pub id: ShippingLineId,
    /// The hydrated shipping method.
    pub method: ShippingOffer,
    /// Price charged for this line.
    pub price: Money,
    /// Order lines this shipping line covers.
    pub assigned_line_ids: Vec<OrderLineId>,
}

impl ShippingLine {
    pub fn new(method: ShippingOffer) -> Self {
        Self {
            id: ShippingLineId::generate(),
            price: method.price,
            method,
            assigned_line_ids: Vec::new(),
        }
    }
}
