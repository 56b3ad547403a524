//! Payment gateway client
//!
//! [`PaymentProvider`] is the seam between checkout and the hosted gateway;
//! [`StripeGateway`] is the production implementation, form-posting to the
//! payment-intents API. Tests substitute their own provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gateway errors
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("gateway request failed: {0}")]
    Request(String),

    #[error("gateway rejected request: {0}")]
    Api(String),
}

/// Opaque metadata attached to a payment intent and echoed back on the
/// confirmation webhook. Key names are part of the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMetadata {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Shipping details, serialized to JSON by the caller
    #[serde(rename = "shippingDetails")]
    pub shipping_details: String,
}

/// The gateway's representation of a pending charge
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Secret the browser uses to complete payment out-of-band
    pub client_secret: String,
    /// Amount in minor currency units
    pub amount: i64,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a payment intent for `amount` minor units of `currency`
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<PaymentIntent, PaymentError>;
}

/// Stripe payment-intents client
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into(),
        }
    }
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: String,
}

#[async_trait]
impl PaymentProvider for StripeGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/v1/payment_intents", self.api_base);
        let amount_str = amount.to_string();
        let params: Vec<(&str, &str)> = vec![
            ("amount", amount_str.as_str()),
            ("currency", currency),
            ("metadata[userId]", metadata.user_id.as_str()),
            ("metadata[shippingDetails]", metadata.shipping_details.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<StripeErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            return Err(PaymentError::Api(message));
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| PaymentError::Request(format!("Invalid intent response: {e}")))?;

        tracing::info!(
            intent_id = %intent.id,
            amount = intent.amount,
            "Payment intent created"
        );

        Ok(intent)
    }
}
