//! Payment gateway integration: intent creation and signed webhooks

pub mod gateway;
pub mod webhook;

pub use gateway::{IntentMetadata, PaymentError, PaymentIntent, PaymentProvider, StripeGateway};
pub use webhook::{
    PAYMENT_SUCCEEDED, SIGNATURE_HEADER, WebhookError, WebhookEvent, WebhookVerifier,
};
