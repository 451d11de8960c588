//! Asset record persistence.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use harvestline_core::{AdminUserId, AssetId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::Asset;

#[derive(Debug, sqlx::FromRow)]
struct AssetRow {
    id: i32,
    object_key: String,
    public_url: String,
    content_type: String,
    size_bytes: i64,
    uploaded_by: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<AssetRow> for Asset {
    fn from(row: AssetRow) -> Self {
        Self {
            id: AssetId::new(row.id),
            object_key: row.object_key,
            public_url: row.public_url,
            content_type: row.content_type,
            size_bytes: row.size_bytes,
            uploaded_by: row.uploaded_by.map(AdminUserId::new),
            created_at: row.created_at,
        }
    }
}

const ASSET_COLUMNS: &str =
    "id, object_key, public_url, content_type, size_bytes, uploaded_by, created_at";

/// Repository for uploaded asset records.
pub struct AssetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AssetRepository<'a> {
    /// Create a new asset repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List asset records, newest first, as the asset picker shows them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Asset>, RepositoryError> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM admin.asset ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, AssetRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Record an uploaded object.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the object key is already
    /// recorded.
    pub async fn create(
        &self,
        object_key: &str,
        public_url: &str,
        content_type: &str,
        size_bytes: i64,
        uploaded_by: AdminUserId,
    ) -> Result<Asset, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO admin.asset (object_key, public_url, content_type, size_bytes, uploaded_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ASSET_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, AssetRow>(&sql)
            .bind(object_key)
            .bind(public_url)
            .bind(content_type)
            .bind(size_bytes)
            .bind(uploaded_by.as_i32())
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "object key already recorded"))?;

        Ok(row.into())
    }

    /// Delete an asset record.
    ///
    /// Removal of the stored object itself is the operator's concern.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such asset exists.
    pub async fn delete(&self, id: AssetId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin.asset WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
