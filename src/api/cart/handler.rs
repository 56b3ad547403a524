//! Cart handlers
//!
//! Write granularity is asymmetric: add persists only the changed slot
//! (merge), remove replaces the whole map. Quantities never go below zero.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{CartData, User};
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

/// Item ids arrive either as JSON numbers or strings; both address the
/// same string-keyed cart slot.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    fn key(&self) -> String {
        match self {
            ItemId::Number(n) => n.to_string(),
            ItemId::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    #[serde(rename = "itemId")]
    pub item_id: ItemId,
    pub quantity: Option<i64>,
}

async fn load_user(state: &ServerState, user_id: &str) -> AppResult<User> {
    let repo = UserRepository::new(state.get_db());
    repo.find_by_key(user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {user_id}")))
}

/// POST /addtocart
pub async fn add_to_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CartItemRequest>,
) -> AppResult<&'static str> {
    let key = req.item_id.key();
    let quantity = req.quantity.unwrap_or(1);

    let stored = load_user(&state, &user.id).await?;
    let current = stored.cart_data.get(&key).copied().unwrap_or(0);
    let updated = current + quantity;

    let repo = UserRepository::new(state.get_db());
    repo.set_cart_entry(&user.id, &key, updated).await?;

    tracing::debug!(user = %user.id, item = %key, quantity = updated, "Cart item added");

    Ok("Added")
}

/// POST /removecart — decrements by one, never below zero
pub async fn remove_from_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CartItemRequest>,
) -> AppResult<&'static str> {
    let key = req.item_id.key();

    let stored = load_user(&state, &user.id).await?;
    let mut cart: CartData = stored.cart_data;

    if let Some(quantity) = cart.get_mut(&key) {
        if *quantity > 0 {
            *quantity -= 1;
            let repo = UserRepository::new(state.get_db());
            repo.replace_cart(&user.id, cart).await?;
            tracing::debug!(user = %user.id, item = %key, "Cart item removed");
        }
    }

    Ok("Removed")
}

/// POST /getcart — the caller's full cart map
pub async fn get_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<CartData>> {
    let stored = load_user(&state, &user.id).await?;
    Ok(Json(stored.cart_data))
}
