//! Auth guard extractor
//!
//! Handlers that take [`CurrentUser`] as an argument require a valid
//! `auth-token` header; extraction fails with 401 before the handler runs.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::JwtService;
use crate::core::ServerState;
use crate::utils::AppError;

/// Header carrying the storefront token
pub const AUTH_TOKEN_HEADER: &str = "auth-token";

/// Authenticated identity extracted from a verified token
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User record key
    pub id: String,
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse if a middleware already extracted it
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                tracing::warn!(uri = %parts.uri, "auth token missing");
                AppError::Unauthorized
            })?;

        let jwt_service: &JwtService = &state.jwt_service;
        match jwt_service.validate_token(token) {
            Ok(claims) => {
                let user = CurrentUser { id: claims.sub };
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(uri = %parts.uri, error = %e, "auth token rejected");
                Err(AppError::Unauthorized)
            }
        }
    }
}
