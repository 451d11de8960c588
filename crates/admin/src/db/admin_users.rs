//! Admin account persistence.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use harvestline_core::{AdminRole, AdminUserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::AdminUser;

/// An admin row including the password hash, for login verification only.
#[derive(Debug, sqlx::FromRow)]
pub struct AdminUserWithHash {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AdminUserWithHash> for AdminUser {
    fn from(row: AdminUserWithHash) -> Self {
        Self {
            id: AdminUserId::new(row.id),
            email: row.email,
            name: row.name,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    email: String,
    name: String,
    role: AdminRole,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AdminUserRow> for AdminUser {
    fn from(row: AdminUserRow) -> Self {
        Self {
            id: AdminUserId::new(row.id),
            email: row.email,
            name: row.name,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, email, name, role, created_at, updated_at";

/// Repository for admin accounts.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin.admin_user ORDER BY email ASC");
        let rows = sqlx::query_as::<_, AdminUserRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an admin account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such account exists.
    pub async fn get(&self, id: AdminUserId) -> Result<AdminUser, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin.admin_user WHERE id = $1");
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Find an account by email, with its password hash, for login.
    ///
    /// Email matching is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AdminUserWithHash>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserWithHash>(
            r"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM admin.admin_user
            WHERE lower(email) = lower($1)
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Insert a new admin account with a pre-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the email is already taken.
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO admin.admin_user (email, name, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(email)
            .bind(name)
            .bind(password_hash)
            .bind(role)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "email already registered"))?;

        Ok(row.into())
    }

    /// Change an account's display name and role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such account exists.
    pub async fn update(
        &self,
        id: AdminUserId,
        name: &str,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let sql = format!(
            r"
            UPDATE admin.admin_user
            SET name = $2, role = $3, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(id.as_i32())
            .bind(name)
            .bind(role)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Replace an account's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such account exists.
    pub async fn set_password_hash(
        &self,
        id: AdminUserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE admin.admin_user SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an admin account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such account exists.
    pub async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin.admin_user WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
