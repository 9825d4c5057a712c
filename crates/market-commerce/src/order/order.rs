//! Order types.

use crate::channel::ChannelRef;
use crate::error::CommerceError;
use crate::ids::{ChannelId, OrderId, OrderLineId, ProductId, SurchargeId, UserId, VariantId};
use crate::money::{Currency, Money};
use crate::order::OrderState;
use crate::shipping::ShippingLine;
use serde::{Deserialize, Serialize};

/// A product variant as hydrated onto an order line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantRef {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    /// Every channel the variant is assigned to, default channel included.
    pub channels: Vec<ChannelRef>,
}

/// A line item in an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Unique line identifier.
    pub id: OrderLineId,
    /// The purchased variant.
    pub variant: VariantRef,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price before tax.
    pub unit_price: Money,
    /// Line price before tax after order-level discounts are prorated.
    pub prorated_line_price: Money,
    /// Explicit seller tag, set once the seller strategy has run.
    pub seller_channel_id: Option<ChannelId>,
}

impl OrderLine {
    /// Create a new order line; the prorated price starts at `unit_price * quantity`.
    pub fn new(variant: VariantRef, quantity: i64, unit_price: Money) -> Result<Self, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let prorated_line_price = unit_price
            .try_multiply(quantity)
            .ok_or(CommerceError::Overflow)?;
        Ok(Self {
            id: OrderLineId::generate(),
            variant,
            quantity,
            unit_price,
            prorated_line_price,
            seller_channel_id: None,
        })
    }

    /// Change the quantity and reprice the line.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        self.prorated_line_price = self
            .unit_price
            .try_multiply(quantity)
            .ok_or(CommerceError::Overflow)?;
        self.quantity = quantity;
        Ok(())
    }
}

/// A non-physical charge line on an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Surcharge {
    pub id: SurchargeId,
    pub description: String,
    /// Used to identify the charge, e.g. `PLATFORM-FEE-2`.
    pub sku: String,
    pub list_price: Money,
    pub list_price_includes_tax: bool,
    /// Tax rate in percent.
    pub tax_rate: u32,
}

/// An order as the marketplace sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order code.
    pub code: String,
    /// Lifecycle state.
    pub state: OrderState,
    /// Order currency.
    pub currency: Currency,
    /// Customer user (None for guests).
    pub customer_user_id: Option<UserId>,
    /// Items in the order.
    pub lines: Vec<OrderLine>,
    /// Attached shipping lines.
    pub shipping_lines: Vec<ShippingLine>,
    /// Non-physical charge lines.
    pub surcharges: Vec<Surcharge>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Order {
    /// Create an empty order in the `AddingItems` state.
    pub fn new(currency: Currency) -> Self {
        let now = current_timestamp();
        Self {
            id: OrderId::generate(),
            code: generate_order_code(),
            state: OrderState::AddingItems,
            currency,
            customer_user_id: None,
            lines: Vec::new(),
            shipping_lines: Vec::new(),
            surcharges: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Total quantity across lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Net merchandise value.
    pub fn sub_total(&self) -> Result<Money, CommerceError> {
        Money::try_sum(self.lines.iter().map(|l| &l.prorated_line_price), self.currency)
            .ok_or(CommerceError::Overflow)
    }

    /// Sum of shipping line prices.
    pub fn shipping_total(&self) -> Result<Money, CommerceError> {
        Money::try_sum(self.shipping_lines.iter().map(|s| &s.price), self.currency)
            .ok_or(CommerceError::Overflow)
    }

    /// Sum of surcharges.
    pub fn surcharge_total(&self) -> Result<Money, CommerceError> {
        Money::try_sum(self.surcharges.iter().map(|s| &s.list_price), self.currency)
            .ok_or(CommerceError::Overflow)
    }

    /// Grand total before tax.
    pub fn total(&self) -> Result<Money, CommerceError> {
        let shipping = self.shipping_total()?;
        let surcharges = self.surcharge_total()?;
        self.sub_total()?
            .try_add(&shipping)
            .and_then(|m| m.try_add(&surcharges))
            .ok_or(CommerceError::Overflow)
    }

    /// Add a line, merging quantity into an existing line for the same variant.
    pub fn add_line(&mut self, line: OrderLine) -> Result<OrderLineId, CommerceError> {
        if line.unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: line.unit_price.currency.code().to_string(),
            });
        }
        if let Some(existing) = self.lines.iter_mut().find(|l| l.variant.id == line.variant.id) {
            let quantity = existing
                .quantity
                .checked_add(line.quantity)
                .ok_or(CommerceError::Overflow)?;
            existing.set_quantity(quantity)?;
            self.updated_at = current_timestamp();
            return Ok(existing.id.clone());
        }
        let id = line.id.clone();
        self.lines.push(line);
        self.updated_at = current_timestamp();
        Ok(id)
    }

    /// Check whether a surcharge with this SKU exists.
    pub fn has_surcharge(&self, sku: &str) -> bool {
        self.surcharges.iter().any(|s| s.sku == sku)
    }

    /// Record an update.
    pub fn touch(&mut self) {
        self.updated_at = current_timestamp();
    }
}

/// Generate an order code.
fn generate_order_code() -> String {
    let id = OrderId::generate();
    let tail: String = id
        .as_str()
        .chars()
        .rev()
        .take(8)
        .collect::<String>()
        .to_uppercase();
    format!("ORD-{}", tail)
}

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: &str) -> VariantRef {
        VariantRef {
            id: VariantId::new(id),
            product_id: ProductId::new("p1"),
            sku: format!("SKU-{}", id),
            name: "Olive Oil".to_string(),
            channels: vec![ChannelRef::seller("1", "1")],
        }
    }

    #[test]
    fn test_order_line_pricing() {
        let line = OrderLine::new(variant("v1"), 3, Money::new(599, Currency::EUR)).unwrap();
        assert_eq!(line.prorated_line_price.amount_minor, 1797);
        assert!(OrderLine::new(variant("v1"), 0, Money::new(599, Currency::EUR)).is_err());
    }

    #[test]
    fn test_add_line_merges_variant() {
        let mut order = Order::new(Currency::EUR);
        let a = order
            .add_line(OrderLine::new(variant("v1"), 1, Money::new(1299, Currency::EUR)).unwrap())
            .unwrap();
        let b = order
            .add_line(OrderLine::new(variant("v1"), 2, Money::new(1299, Currency::EUR)).unwrap())
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.total_quantity(), 3);
        assert_eq!(order.sub_total().unwrap().amount_minor, 3897);
    }

    #[test]
    fn test_add_line_currency_mismatch() {
        let mut order = Order::new(Currency::EUR);
        let line = OrderLine::new(variant("v1"), 1, Money::new(100, Currency::USD)).unwrap();
        assert!(matches!(
            order.add_line(line),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_order_code_prefix() {
        assert!(Order::new(Currency::EUR).code.starts_with("ORD-"));
    }
}
