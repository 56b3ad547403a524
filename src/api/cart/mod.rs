//! Cart API module (authenticated)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/addtocart", post(handler::add_to_cart))
        .route("/removecart", post(handler::remove_from_cart))
        .route("/getcart", post(handler::get_cart))
}
