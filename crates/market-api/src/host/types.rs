//! Entities and inputs exchanged with host services.

use market_commerce::channel::ChannelRef;
use market_commerce::order::VariantRef;
use market_commerce::{
    AdministratorId, ChannelId, Currency, CustomerId, Money, PaymentId, PaymentMethodId, ProductId,
    RoleId, SellerId, StockLocationId, TaxCategoryId, TaxRateId, UserId, VariantId, ZoneId,
};
use serde::{Deserialize, Serialize};

/// A geographic zone used for shipping and tax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
}

/// Host permissions granted through roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Authenticated,
    SuperAdmin,
    CreateAdministrator,
    ReadCatalog,
    CreateCatalog,
    UpdateCatalog,
    DeleteCatalog,
    ReadOrder,
    UpdateOrder,
    ReadCustomer,
    UpdateCustomer,
    ReadShippingMethod,
    CreateShippingMethod,
    UpdateShippingMethod,
    ReadStockLocation,
    CreateStockLocation,
    UpdateStockLocation,
}

/// Permissions of the administrator role created for every seller.
pub const SELLER_ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::Authenticated,
    Permission::ReadCatalog,
    Permission::CreateCatalog,
    Permission::UpdateCatalog,
    Permission::DeleteCatalog,
    Permission::ReadOrder,
    Permission::UpdateOrder,
    Permission::ReadCustomer,
    Permission::UpdateCustomer,
    Permission::ReadShippingMethod,
    Permission::CreateShippingMethod,
    Permission::UpdateShippingMethod,
    Permission::ReadStockLocation,
    Permission::CreateStockLocation,
    Permission::UpdateStockLocation,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub code: String,
    pub description: String,
    pub permissions: Vec<Permission>,
    pub channel_ids: Vec<ChannelId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoleInput {
    pub code: String,
    pub description: String,
    pub permissions: Vec<Permission>,
}

/// A user account with its roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub identifier: String,
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Administrator {
    pub id: AdministratorId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAdministratorInput {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password: String,
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChannelInput {
    pub code: String,
    pub token: String,
    pub seller_id: Option<SellerId>,
    pub currency: Currency,
    pub prices_include_tax: bool,
    pub default_shipping_zone_id: Option<ZoneId>,
    pub default_tax_zone_id: Option<ZoneId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLocation {
    pub id: StockLocationId,
    pub name: String,
    pub description: String,
    pub channel_ids: Vec<ChannelId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStockLocationInput {
    pub name: String,
    pub description: String,
}

/// A flat-rate shipping method definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateShippingMethodInput {
    pub code: String,
    pub name: String,
    pub description: String,
    /// Eligibility checker code, e.g. `seller-only-eligibility-checker`.
    pub checker_code: Option<String>,
    /// Flat rate in minor units.
    pub rate: i64,
    pub rate_includes_tax: bool,
    pub fulfillment_handler: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCategory {
    pub id: TaxCategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRate {
    pub id: TaxRateId,
    pub name: String,
    pub enabled: bool,
    /// Percent.
    pub value: u32,
    pub zone_id: ZoneId,
    pub category_id: TaxCategoryId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaxRateInput {
    pub name: String,
    pub enabled: bool,
    pub value: u32,
    pub zone_id: ZoneId,
    pub category_id: TaxCategoryId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub handler_code: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentMethodInput {
    pub code: String,
    pub name: String,
    pub description: String,
    pub handler_code: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCustomerInput {
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub price: Money,
    pub stock_on_hand: i64,
    pub tax_category_id: Option<TaxCategoryId>,
    pub channels: Vec<ChannelRef>,
}

impl ProductVariant {
    /// The variant as an order line sees it.
    pub fn to_variant_ref(&self) -> VariantRef {
        VariantRef {
            id: self.id.clone(),
            product_id: self.product_id.clone(),
            sku: self.sku.clone(),
            name: self.name.clone(),
            channels: self.channels.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub variants: Vec<ProductVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVariantInput {
    pub sku: String,
    pub name: String,
    /// Price in minor units.
    pub price: i64,
    pub stock_on_hand: i64,
    pub tax_category_id: Option<TaxCategoryId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub variants: Vec<CreateVariantInput>,
}

/// Input for a non-physical charge line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargeInput {
    pub description: String,
    pub sku: String,
    pub list_price: Money,
    pub list_price_includes_tax: bool,
    pub tax_rate: u32,
}

impl From<market_commerce::seller::FeeCharge> for SurchargeInput {
    fn from(charge: market_commerce::seller::FeeCharge) -> Self {
        Self {
            description: charge.description,
            sku: charge.sku,
            list_price: charge.list_price,
            list_price_includes_tax: charge.list_price_includes_tax,
            tax_rate: charge.tax_rate,
        }
    }
}

/// Payment lifecycle as the host tracks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentState {
    Created,
    Authorized,
    Settled,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub method_code: String,
    pub amount: Money,
    pub state: PaymentState,
    pub transaction_id: String,
    pub metadata: serde_json::Value,
}
