//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! hl-cli admin create -e admin@example.com -n "Admin Name" -r super_admin -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use secrecy::SecretString;
use thiserror::Error;

use harvestline_admin::db::{self, AdminUserRepository, RepositoryError};
use harvestline_admin::services::auth::{self, AuthError};
use harvestline_core::{AdminRole, Email};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password rejected.
    #[error(transparent)]
    Password(#[from] AuthError),

    /// User already exists.
    #[error("Admin user already exists with email: {0}")]
    UserExists(String),
}

/// Create a new admin user with a password.
///
/// # Returns
///
/// The ID of the created admin user.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
    role: &str,
) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    // Hash before touching the database so bad passwords fail fast
    let password_hash = auth::hash_password(password)?;

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;
    let repo = AdminUserRepository::new(&pool);

    tracing::info!("Creating admin user: {} ({})", email.as_str(), role);

    if repo.find_by_email(email.as_str()).await?.is_some() {
        return Err(AdminError::UserExists(email.as_str().to_owned()));
    }

    let user = repo
        .create(email.as_str(), name, &password_hash, role)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id.as_i32())
}
