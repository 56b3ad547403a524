//! Webhook signature verification and event types
//!
//! The gateway signs each callback with HMAC-SHA256 over `"{t}.{body}"`
//! and delivers the result in the `stripe-signature` header as
//! `t=<unix-ts>,v1=<hex-mac>`. Verification against the shared webhook
//! secret is the sole integrity control separating a legitimate payment
//! confirmation from a forged one.

use std::collections::BTreeMap;

use chrono::Utc;
use ring::hmac;
use serde::Deserialize;
use thiserror::Error;

/// Header carrying the gateway signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Event type emitted when a payment completes
pub const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Maximum accepted age of a signed timestamp
const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("malformed signature header")]
    BadHeader,

    #[error("signature verification failed")]
    BadSignature,

    #[error("timestamp outside tolerance")]
    StaleTimestamp,

    #[error("unparseable event payload: {0}")]
    BadPayload(String),
}

/// Verifies (and, for tests, produces) webhook signatures
#[derive(Clone)]
pub struct WebhookVerifier {
    key: hmac::Key,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Verify `header` against the raw request `payload`.
    ///
    /// Accepts if any `v1` entry is a valid MAC over `"{t}.{payload}"` and
    /// `t` is within tolerance of the current time.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), WebhookError> {
        let (timestamp, signatures) = parse_header(header)?;

        let age = (Utc::now().timestamp() - timestamp).abs();
        if age > self.tolerance_secs {
            return Err(WebhookError::StaleTimestamp);
        }

        let signed_payload = signed_payload(payload, timestamp);
        for sig_hex in &signatures {
            if let Ok(sig) = hex::decode(sig_hex) {
                if hmac::verify(&self.key, &signed_payload, &sig).is_ok() {
                    return Ok(());
                }
            }
        }

        Err(WebhookError::BadSignature)
    }

    /// Produce a valid signature header for `payload` at `timestamp`.
    ///
    /// Counterpart of [`verify`](Self::verify), used to simulate gateway
    /// callbacks in tests.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> String {
        let tag = hmac::sign(&self.key, &signed_payload(payload, timestamp));
        format!("t={},v1={}", timestamp, hex::encode(tag.as_ref()))
    }
}

fn signed_payload(payload: &[u8], timestamp: i64) -> Vec<u8> {
    let mut signed = timestamp.to_string().into_bytes();
    signed.push(b'.');
    signed.extend_from_slice(payload);
    signed
}

fn parse_header(header: &str) -> Result<(i64, Vec<String>), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(v)) => {
                timestamp = Some(v.parse().map_err(|_| WebhookError::BadHeader)?);
            }
            (Some("v1"), Some(v)) => signatures.push(v.to_string()),
            // Unknown schemes (v0 etc.) are ignored
            _ => {}
        }
    }

    match (timestamp, signatures.is_empty()) {
        (Some(t), false) => Ok((t, signatures)),
        _ => Err(WebhookError::BadHeader),
    }
}

// ===== Event payload =====

/// Signed gateway callback event
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: PaymentIntentObject,
}

/// The payment intent embedded in a confirmation event
#[derive(Debug, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    /// Amount in minor currency units
    pub amount: i64,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(payload).map_err(|e| WebhookError::BadPayload(e.to_string()))
    }
}
