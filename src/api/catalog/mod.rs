//! Catalog API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/addproduct", post(handler::add_product))
        .route("/removeproduct", post(handler::remove_product))
        .route("/allproducts", get(handler::all_products))
        .route("/newcollections", get(handler::new_collections))
        .route("/popularsnacks", get(handler::popular_snacks))
}
