//! Checkout and payment-confirmation API module
//!
//! `/checkout` requires an authenticated user; `/webhook` is called by the
//! payment gateway and is authenticated by its signature instead.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/checkout", post(handler::checkout))
        .route("/webhook", post(handler::webhook))
}
