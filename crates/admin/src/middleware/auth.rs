//! Authentication extractors for admin route handlers.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use harvestline_core::AdminRole;

use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires an authenticated admin.
///
/// Rejects with 401 Unauthorized when no admin is logged in.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when authentication is required but missing.
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Authentication required"})),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = Unauthorized;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await.ok_or(Unauthorized)?;
        Ok(Self(admin))
    }
}

/// Extractor that requires the `SuperAdmin` role.
///
/// Rejects with 401 when not logged in, 403 for any lesser role.
pub struct RequireSuperAdmin(pub CurrentAdmin);

/// Error returned when super admin authentication is required.
pub enum SuperAdminRejection {
    Unauthorized,
    Forbidden,
}

impl IntoResponse for SuperAdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => Unauthorized.into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({"error": "Only super admins can access this resource"})),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = SuperAdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts)
            .await
            .ok_or(SuperAdminRejection::Unauthorized)?;

        if admin.role != AdminRole::SuperAdmin {
            return Err(SuperAdminRejection::Forbidden);
        }

        Ok(Self(admin))
    }
}

/// Extractor that optionally gets the current admin without rejecting.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_admin(parts).await))
    }
}

/// Read the current admin from the session placed in request extensions by
/// `SessionManagerLayer`.
async fn current_admin(parts: &Parts) -> Option<CurrentAdmin> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
}

/// Reject mutations from read-only roles.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when the role cannot write.
pub fn ensure_can_write(admin: &CurrentAdmin) -> Result<(), AppError> {
    if admin.role.can_write() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "your role is read-only".to_string(),
        ))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvestline_core::AdminUserId;

    fn admin_with_role(role: AdminRole) -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::new(1),
            email: "ops@harvestline.example".to_string(),
            name: "Ops".to_string(),
            role,
        }
    }

    #[test]
    fn test_ensure_can_write_by_role() {
        assert!(ensure_can_write(&admin_with_role(AdminRole::SuperAdmin)).is_ok());
        assert!(ensure_can_write(&admin_with_role(AdminRole::Admin)).is_ok());
        assert!(matches!(
            ensure_can_write(&admin_with_role(AdminRole::Viewer)),
            Err(AppError::Forbidden(_))
        ));
    }
}
