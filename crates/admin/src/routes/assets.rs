//! Asset routes: presigned uploads and the asset picker list.
//!
//! Upload flow: the client asks for a presigned PUT URL, uploads the bytes
//! directly to object storage, then records the asset here. The stored
//! public URL is what content editors embed.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use harvestline_core::AssetId;

use super::non_empty;
use crate::db::AssetRepository;
use crate::error::{AppError, FieldError};
use crate::middleware::{RequireAdminAuth, ensure_can_write};
use crate::models::Asset;
use crate::services::storage::presign_put;
use crate::state::AppState;

/// Build the asset router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/assets", get(list_assets).post(record_asset))
        .route("/api/assets/presign", post(presign_upload))
        .route("/api/assets/{id}", axum::routing::delete(delete_asset))
}

/// Request for a presigned upload URL.
#[derive(Debug, Deserialize)]
pub struct PresignRequest {
    pub filename: String,
    pub content_type: String,
}

/// A minted upload slot.
#[derive(Debug, Serialize)]
pub struct PresignResponse {
    pub upload_url: String,
    pub public_url: String,
    pub object_key: String,
    pub expires_in_seconds: u64,
}

/// Request to record a completed upload.
#[derive(Debug, Deserialize)]
pub struct RecordAssetRequest {
    pub object_key: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// GET /api/assets
async fn list_assets(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Asset>>, AppError> {
    let repo = AssetRepository::new(state.pool());
    Ok(Json(repo.list().await?))
}

/// Mint a presigned PUT URL for a new object.
///
/// POST /api/assets/presign
async fn presign_upload(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<PresignRequest>,
) -> Result<Json<PresignResponse>, AppError> {
    ensure_can_write(&admin)?;

    let mut errors: Vec<FieldError> = Vec::new();
    let filename = non_empty(&mut errors, "filename", &request.filename);
    non_empty(&mut errors, "content_type", &request.content_type);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let object_key = object_key_for(&filename);
    let upload = presign_put(state.config().storage(), &object_key);

    tracing::info!(%object_key, admin_id = %admin.id, "Presigned upload minted");

    Ok(Json(PresignResponse {
        upload_url: upload.upload_url,
        public_url: upload.public_url,
        object_key: upload.object_key,
        expires_in_seconds: upload.expires_in_seconds,
    }))
}

/// Record a completed upload.
///
/// POST /api/assets
async fn record_asset(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<RecordAssetRequest>,
) -> Result<(StatusCode, Json<Asset>), AppError> {
    ensure_can_write(&admin)?;

    let mut errors: Vec<FieldError> = Vec::new();
    let object_key = non_empty(&mut errors, "object_key", &request.object_key);
    let content_type = non_empty(&mut errors, "content_type", &request.content_type);
    if request.size_bytes <= 0 {
        errors.push(FieldError::new("size_bytes", "must be positive"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // The durable URL is derived server-side, never taken from the client
    let storage = state.config().storage();
    let public_url = format!("{}/{object_key}", storage.public_base_url);

    let repo = AssetRepository::new(state.pool());
    let asset = repo
        .create(
            &object_key,
            &public_url,
            &content_type,
            request.size_bytes,
            admin.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(asset)))
}

/// Delete an asset record. The stored object is the operator's concern.
///
/// DELETE /api/assets/:id
async fn delete_asset(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ensure_can_write(&admin)?;

    let repo = AssetRepository::new(state.pool());
    repo.delete(AssetId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("asset {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build a collision-free object key: `uploads/YYYY/MM/{uuid}-{name}`.
fn object_key_for(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    let now = Utc::now();
    format!(
        "uploads/{}/{}-{sanitized}",
        now.format("%Y/%m"),
        Uuid::new_v4()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_sanitizes_filename() {
        let key = object_key_for("Feed Mix (Final).PNG");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with("-feed-mix--final-.png"));
        assert!(!key.contains(' '));
    }
}
