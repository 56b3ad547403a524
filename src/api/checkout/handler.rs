//! Checkout and webhook handlers
//!
//! The checkout total is always recomputed server-side from the stored cart
//! and product prices; nothing the client sends affects the charge. Orders
//! are only created from a signature-verified gateway callback, and each
//! payment intent finalizes at most one order.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderStatus, ShippingDetails};
use crate::db::repository::{OrderRepository, ProductRepository, UserRepository};
use crate::payment::{IntentMetadata, PAYMENT_SUCCEEDED, SIGNATURE_HEADER, WebhookEvent};
use crate::utils::{AppError, AppResult};

const CURRENCY: &str = "usd";

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(rename = "shippingDetails", default)]
    pub shipping_details: ShippingDetails,
}

/// POST /checkout
///
/// Creates a payment intent for the caller's current cart and returns the
/// client secret the browser needs to complete payment.
pub async fn checkout(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<Value>> {
    let users = UserRepository::new(state.get_db());
    let stored = users
        .find_by_key(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", user.id)))?;

    let total = cart_total(&state, &stored.cart_data).await?;
    let amount = (total * 100.0).round() as i64;

    let shipping_json = serde_json::to_string(&req.shipping_details)
        .map_err(|e| AppError::internal(format!("Failed to encode shipping details: {e}")))?;
    let metadata = IntentMetadata {
        user_id: user.id.clone(),
        shipping_details: shipping_json,
    };

    let intent = state
        .payments
        .create_intent(amount, CURRENCY, metadata)
        .await
        .map_err(|e| AppError::Gateway(e.to_string()))?;

    tracing::info!(user = %user.id, amount, intent_id = %intent.id, "Checkout started");

    Ok(Json(json!({ "clientSecret": intent.client_secret })))
}

/// Authoritative order total: stored price times quantity over every cart
/// slot with a positive count. Slots that no longer match a product are
/// skipped.
async fn cart_total(
    state: &ServerState,
    cart: &crate::db::models::CartData,
) -> AppResult<f64> {
    let products = ProductRepository::new(state.get_db());
    let mut total = 0.0;

    for (item, quantity) in cart.iter().filter(|(_, q)| **q > 0) {
        let Ok(product_id) = item.parse::<i64>() else {
            continue;
        };
        if let Some(product) = products.find_by_product_id(product_id).await? {
            total += product.new_price * (*quantity as f64);
        }
    }

    Ok(total)
}

/// POST /webhook — gateway payment-confirmation callback
///
/// Verifies the signature over the raw body, then finalizes the order for a
/// `payment_intent.succeeded` event. Replayed intents are acknowledged
/// without writing a second order.
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Webhook("missing signature header".to_string()))?;

    state
        .webhook_verifier
        .verify(&body, signature)
        .map_err(|e| AppError::Webhook(e.to_string()))?;

    let event = WebhookEvent::parse(&body).map_err(|e| AppError::Webhook(e.to_string()))?;

    if event.event_type == PAYMENT_SUCCEEDED {
        finalize_order(&state, event).await?;
    } else {
        tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
    }

    Ok(Json(json!({ "received": true })))
}

async fn finalize_order(state: &ServerState, event: WebhookEvent) -> AppResult<()> {
    let intent = event.data.object;

    let orders = OrderRepository::new(state.get_db());
    let existing = orders
        .find_by_intent(&intent.id)
        .await
        .map_err(|e| AppError::Webhook(e.to_string()))?;
    if existing.is_some() {
        tracing::info!(intent_id = %intent.id, "Duplicate webhook delivery, order already exists");
        return Ok(());
    }

    let user_id = intent
        .metadata
        .get("userId")
        .ok_or_else(|| AppError::Webhook("missing userId metadata".to_string()))?;
    let shipping: ShippingDetails = intent
        .metadata
        .get("shippingDetails")
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default();

    let users = UserRepository::new(state.get_db());
    let owner = users
        .find_by_key(user_id)
        .await
        .map_err(|e| AppError::Webhook(e.to_string()))?
        .ok_or_else(|| AppError::Webhook(format!("unknown user {user_id}")))?;

    let order = Order {
        id: None,
        user_id: user_id.clone(),
        items: owner.cart_data,
        total_amount: intent.amount as f64 / 100.0,
        status: OrderStatus::Paid,
        shipping_details: shipping,
        payment_intent_id: intent.id.clone(),
        date: Utc::now(),
    };
    orders
        .create(order)
        .await
        .map_err(|e| AppError::Webhook(e.to_string()))?;

    users
        .clear_cart(user_id)
        .await
        .map_err(|e| AppError::Webhook(e.to_string()))?;

    tracing::info!(
        intent_id = %intent.id,
        user = %user_id,
        amount = intent.amount,
        "Order finalized"
    );

    Ok(())
}
