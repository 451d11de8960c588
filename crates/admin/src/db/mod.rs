//! Database operations for the back-office.
//!
//! The admin service owns the schema (migrations live in this crate) and is
//! the write path for catalog and content; conversations and invoices are
//! also written by the public site's chat flow.
//!
//! Queries use the runtime sqlx API with explicit row types; rows convert
//! into domain models via `TryFrom`, surfacing malformed JSONB columns as
//! `RepositoryError::DataCorruption`.

pub mod admin_users;
pub mod assets;
pub mod catalog;
pub mod content;
pub mod conversations;
pub mod invoices;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use assets::AssetRepository;
pub use catalog::{CatalogRepository, IngredientInput, ProductInput};
pub use content::{BlogPostInput, ContentRepository, PolicyInput, TeamMemberInput};
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

    /// Constraint violation (e.g., duplicate email or invoice number).
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

/// Map a unique-violation database error onto `Conflict`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::Conflict(message.to_string())
        }
        other => other.into(),
    }
}
