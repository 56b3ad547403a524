//! Account handlers
//!
//! Wire behavior matches the storefront frontend's expectations: duplicate
//! signup is a 400, but failed login is a 200 with `success: false` — the
//! frontend branches on the body, not the status code.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::db::models::{User, seeded_cart};
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /signup
pub async fn signup(
    State(state): State<ServerState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<Json<Value>> {
    let repo = UserRepository::new(state.get_db());

    if repo.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::validation(
            "Existing User Found With Email/Password",
        ));
    }

    let user = User {
        id: None,
        name: req.username,
        email: req.email,
        password: hash_password(&req.password)?,
        cart_data: seeded_cart(),
        date: Utc::now(),
    };

    let created = repo.create(user).await?;
    let token = state
        .jwt_service
        .generate_token(&created.key())
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user = %created.key(), email = %created.email, "User signed up");

    Ok(Json(json!({ "success": true, "token": token })))
}

/// POST /login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    let repo = UserRepository::new(state.get_db());

    let Some(user) = repo.find_by_email(&req.email).await? else {
        return Ok(Json(json!({ "success": false, "errors": "Wrong Email" })));
    };

    if !verify_password(&req.password, &user.password) {
        tracing::warn!(email = %req.email, "Login failed - wrong password");
        return Ok(Json(json!({ "success": false, "errors": "Wrong Password" })));
    }

    let token = state
        .jwt_service
        .generate_token(&user.key())
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user = %user.key(), "User logged in");

    Ok(Json(json!({ "success": true, "token": token })))
}

/// Argon2 hash for storage
fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }
}
