//! Payment method handlers.

use async_trait::async_trait;
use market_commerce::order::Order;
use market_commerce::Money;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RequestContext;
use crate::error::BackendError;
use crate::host::{Payment, PaymentState};

/// Code of the manual payment handler and method.
pub const MANUAL_PAYMENT_CODE: &str = "manual";

/// Transaction id used when the caller supplies none.
pub const MANUAL_TRANSACTION_ID: &str = "manual-auth";

/// Outcome of creating a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentResult {
    pub amount: Money,
    pub state: PaymentState,
    pub transaction_id: String,
    pub metadata: Value,
}

/// Outcome of settling a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlePaymentResult {
    pub success: bool,
    pub metadata: Value,
}

/// Integrates a payment provider with the host.
#[async_trait]
pub trait PaymentMethodHandler: Send + Sync {
    fn code(&self) -> &str;

    fn description(&self) -> &str;

    async fn create_payment(
        &self,
        ctx: &RequestContext,
        order: &Order,
        amount: Money,
        metadata: &Value,
    ) -> Result<CreatePaymentResult, BackendError>;

    async fn settle_payment(
        &self,
        ctx: &RequestContext,
        order: &Order,
        payment: &Payment,
    ) -> Result<SettlePaymentResult, BackendError>;
}

/// Manual payments for development: authorize immediately, always settle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualPaymentHandler;

#[async_trait]
impl PaymentMethodHandler for ManualPaymentHandler {
    fn code(&self) -> &str {
        MANUAL_PAYMENT_CODE
    }

    fn description(&self) -> &str {
        "Manual payment (dev)"
    }

    async fn create_payment(
        &self,
        _ctx: &RequestContext,
        _order: &Order,
        amount: Money,
        metadata: &Value,
    ) -> Result<CreatePaymentResult, BackendError> {
        let transaction_id = metadata
            .get("txId")
            .and_then(Value::as_str)
            .unwrap_or(MANUAL_TRANSACTION_ID)
            .to_string();
        Ok(CreatePaymentResult {
            amount,
            state: PaymentState::Authorized,
            transaction_id,
            metadata: metadata.clone(),
        })
    }

    async fn settle_payment(
        &self,
        _ctx: &RequestContext,
        _order: &Order,
        _payment: &Payment,
    ) -> Result<SettlePaymentResult, BackendError> {
        Ok(SettlePaymentResult {
            success: true,
            metadata: serde_json::json!({ "settledAt": chrono::Utc::now().to_rfc3339() }),
        })
    }
}
