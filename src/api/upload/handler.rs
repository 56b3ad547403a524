//! Image upload handler
//!
//! Accepts a multipart form with a `product` file field, stores it under
//! the upload directory with a timestamped name, and returns both the
//! relative path (stable across deploys) and an absolute URL derived from
//! the configured base URL or the request's forwarding headers.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Multipart field name carrying the image
const FILE_FIELD: &str = "product";

/// POST /upload
pub async fn upload(
    State(state): State<ServerState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let mut saved: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await?;

        let filename = format!(
            "product_{}{}",
            Utc::now().timestamp_millis(),
            extension(&original_name)
        );
        let dir = state.config.images_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Upload(format!("Failed to create upload dir: {e}")))?;
        tokio::fs::write(dir.join(&filename), &data)
            .await
            .map_err(|e| AppError::Upload(format!("Failed to store file: {e}")))?;

        tracing::info!(file = %filename, bytes = data.len(), "Image uploaded");
        saved = Some(filename);
        break;
    }

    let filename = saved.ok_or_else(|| AppError::Upload("No file provided".to_string()))?;
    let image_path = format!("/images/{filename}");
    let image_url = format!("{}{image_path}", base_url(&state, &headers));

    Ok(Json(json!({
        "success": 1,
        "image_path": image_path,
        "image_url": image_url,
    })))
}

/// File extension of `name` including the dot, or empty
fn extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

/// Public base URL for uploaded-image links: the configured value if set,
/// otherwise reconstructed from proxy forwarding headers.
fn base_url(state: &ServerState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config.public_base_url {
        return base.trim_end_matches('/').to_string();
    }

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get("host"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{proto}://{host}")
}
