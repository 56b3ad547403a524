//! Catalog handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::db::models::{ProductCreate, ProductView};
use crate::db::repository::ProductRepository;
use crate::utils::AppResult;

/// Category featured by `/popularsnacks`
const POPULAR_CATEGORY: &str = "sweets";
/// Number of products in the popular view
const POPULAR_SIZE: usize = 4;
/// Number of products in the new-collection view
const NEW_COLLECTION_SIZE: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RemoveProductRequest {
    pub id: i64,
}

/// POST /addproduct
pub async fn add_product(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Value>> {
    let repo = ProductRepository::new(state.get_db());
    let created = repo.create(payload).await?;

    tracing::info!(
        product_id = created.product_id,
        name = %created.name,
        "Product created"
    );

    Ok(Json(json!({ "success": true, "name": created.name })))
}

/// POST /removeproduct — idempotent, removing a missing id still succeeds
pub async fn remove_product(
    State(state): State<ServerState>,
    Json(payload): Json<RemoveProductRequest>,
) -> AppResult<Json<Value>> {
    let repo = ProductRepository::new(state.get_db());
    repo.delete_by_product_id(payload.id).await?;

    tracing::info!(product_id = payload.id, "Product removed");

    Ok(Json(json!({ "success": true })))
}

/// GET /allproducts
pub async fn all_products(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<ProductView>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_all().await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// GET /newcollections — skip the first product, take the last 8
pub async fn new_collections(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<ProductView>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_all().await?;

    let tail: Vec<ProductView> = products
        .into_iter()
        .skip(1)
        .map(ProductView::from)
        .collect();
    let start = tail.len().saturating_sub(NEW_COLLECTION_SIZE);

    Ok(Json(tail[start..].to_vec()))
}

/// GET /popularsnacks — first 4 products of the featured category
pub async fn popular_snacks(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<ProductView>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_by_category(POPULAR_CATEGORY).await?;

    Ok(Json(
        products
            .into_iter()
            .take(POPULAR_SIZE)
            .map(ProductView::from)
            .collect(),
    ))
}
