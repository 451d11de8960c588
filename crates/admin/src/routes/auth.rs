//! Login, logout, and session introspection.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;

use crate::db::AdminUserRepository;
use crate::error::AppError;
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::{AdminUser, CurrentAdmin};
use crate::services::auth::verify_password;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

/// Login credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The current session's admin, if any.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub admin: Option<CurrentAdmin>,
}

/// Authenticate with email and password.
///
/// POST /api/auth/login
///
/// The response never distinguishes an unknown email from a wrong password.
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<CurrentAdmin>, Response> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(invalid_credentials());
    }

    let repo = AdminUserRepository::new(state.pool());
    let Some(user) = repo
        .find_by_email(email)
        .await
        .map_err(|e| AppError::from(e).into_response())?
    else {
        tracing::warn!(email, "Login attempt for unknown email");
        return Err(invalid_credentials());
    };

    if !verify_password(&request.password, &user.password_hash) {
        tracing::warn!(email, "Login attempt with wrong password");
        return Err(invalid_credentials());
    }

    let user: AdminUser = user.into();
    let current = CurrentAdmin::from(&user);

    // Rotate the session ID on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")).into_response())?;
    set_current_admin(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")).into_response())?;

    tracing::info!(admin_id = %current.id, "Admin logged in");
    Ok(Json(current))
}

/// End the current session.
///
/// POST /api/auth/logout
async fn logout(session: Session) -> Result<StatusCode, AppError> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Report the logged-in admin, or `null` when logged out.
///
/// GET /api/auth/me
async fn me(OptionalAdminAuth(admin): OptionalAdminAuth) -> Json<MeResponse> {
    Json(MeResponse { admin })
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Invalid email or password"})),
    )
        .into_response()
}
