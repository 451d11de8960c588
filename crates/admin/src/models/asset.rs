//! Uploaded asset records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use harvestline_core::{AdminUserId, AssetId};

/// A stored object reference.
///
/// The object itself lives in S3-compatible storage; this row records the
/// durable public URL the asset picker hands out.
#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub id: AssetId,
    pub object_key: String,
    pub public_url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<AdminUserId>,
    pub created_at: DateTime<Utc>,
}
