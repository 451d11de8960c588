//! Admin account models and session keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use harvestline_core::{AdminRole, AdminUserId};

/// Session storage keys.
pub mod session_keys {
    /// Key for the currently authenticated admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

/// A back-office account.
///
/// The password hash never leaves the database layer; responses serialize
/// this struct, which does not carry it.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: String,
    pub name: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The authenticated admin stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: String,
    pub name: String,
    pub role: AdminRole,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}
