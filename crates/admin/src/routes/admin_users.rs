//! Admin account management routes. Super admin only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use harvestline_core::{AdminRole, AdminUserId, Email};

use super::non_empty;
use crate::db::AdminUserRepository;
use crate::error::{AppError, FieldError};
use crate::middleware::RequireSuperAdmin;
use crate::models::AdminUser;
use crate::services::auth::{AuthError, hash_password};
use crate::state::AppState;

/// Build the admin user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin-users", get(list_users).post(create_user))
        .route(
            "/api/admin-users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route(
            "/api/admin-users/{id}/password",
            axum::routing::put(set_password),
        )
}

/// Account creation payload.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: AdminRole,
}

/// Account update payload (name and role only).
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub role: AdminRole,
}

/// Password reset payload.
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub password: String,
}

/// GET /api/admin-users
async fn list_users(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUser>>, AppError> {
    let repo = AdminUserRepository::new(state.pool());
    Ok(Json(repo.list().await?))
}

/// GET /api/admin-users/:id
async fn get_user(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AdminUser>, AppError> {
    let repo = AdminUserRepository::new(state.pool());
    let user = repo
        .get(AdminUserId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("admin user {id}"), e))?;
    Ok(Json(user))
}

/// POST /api/admin-users
async fn create_user(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<AdminUser>), AppError> {
    let mut errors: Vec<FieldError> = Vec::new();
    let name = non_empty(&mut errors, "name", &request.name);
    let email = match Email::parse(request.email.trim()) {
        Ok(email) => email.into_inner(),
        Err(e) => {
            errors.push(FieldError::new("email", e.to_string()));
            String::new()
        }
    };
    let password_hash = match hash_password(&request.password) {
        Ok(hash) => hash,
        Err(AuthError::PasswordTooShort) => {
            errors.push(FieldError::new(
                "password",
                AuthError::PasswordTooShort.to_string(),
            ));
            String::new()
        }
        Err(AuthError::Hashing(e)) => return Err(AppError::Internal(e)),
    };
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let repo = AdminUserRepository::new(state.pool());
    let user = repo
        .create(&email, &name, &password_hash, request.role)
        .await?;

    tracing::info!(admin_user_id = %user.id, role = %user.role, "Admin account created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/admin-users/:id
async fn update_user(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<AdminUser>, AppError> {
    let mut errors: Vec<FieldError> = Vec::new();
    let name = non_empty(&mut errors, "name", &request.name);
    // A super admin cannot demote themselves and lock the team out
    if admin.id == AdminUserId::new(id) && request.role != AdminRole::SuperAdmin {
        errors.push(FieldError::new("role", "cannot change your own role"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let repo = AdminUserRepository::new(state.pool());
    let user = repo
        .update(AdminUserId::new(id), &name, request.role)
        .await
        .map_err(|e| AppError::for_entity(&format!("admin user {id}"), e))?;
    Ok(Json(user))
}

/// PUT /api/admin-users/:id/password
async fn set_password(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<SetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    let password_hash = match hash_password(&request.password) {
        Ok(hash) => hash,
        Err(AuthError::PasswordTooShort) => {
            return Err(AppError::Validation(vec![FieldError::new(
                "password",
                AuthError::PasswordTooShort.to_string(),
            )]));
        }
        Err(AuthError::Hashing(e)) => return Err(AppError::Internal(e)),
    };

    let repo = AdminUserRepository::new(state.pool());
    repo.set_password_hash(AdminUserId::new(id), &password_hash)
        .await
        .map_err(|e| AppError::for_entity(&format!("admin user {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin-users/:id
async fn delete_user(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if admin.id == AdminUserId::new(id) {
        return Err(AppError::BadRequest(
            "cannot delete your own account".to_string(),
        ));
    }

    let repo = AdminUserRepository::new(state.pool());
    repo.delete(AdminUserId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("admin user {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}
