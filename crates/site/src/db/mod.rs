//! Database operations for the public site.
//!
//! The site reads the shared `harvestline` database: catalog and content
//! tables are written by the admin service, conversations and invoices are
//! written here by the chat widget.
//!
//! Queries use the runtime sqlx API with explicit row types; rows convert
//! into domain models via `TryFrom`, surfacing malformed JSONB columns as
//! `RepositoryError::DataCorruption`.

pub mod catalog;
pub mod content;
pub mod conversations;
pub mod invoices;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::CatalogRepository;
pub use content::ContentRepository;
pub use conversations::ConversationRepository;
pub use invoices::InvoiceRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate invoice number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse a JSONB column into a typed value.
///
/// Used by row conversions; the column name is included in the error for
/// debugging.
pub(crate) fn parse_jsonb<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    column: &str,
) -> Result<T, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column}: {e}")))
}

/// Serialize a typed value into a JSONB column.
pub(crate) fn to_jsonb<T: serde::Serialize>(
    value: &T,
    column: &str,
) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("cannot encode {column}: {e}")))
}
