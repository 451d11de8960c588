//! Contact form route handler.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;

use harvestline_core::Email;

use crate::db::ContentRepository;
use crate::error::AppError;
use crate::models::ContactInquiry;
use crate::state::AppState;

const MAX_MESSAGE_LENGTH: usize = 5_000;

/// Build the contact router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/contact", post(create_inquiry))
}

/// A contact form submission.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Submit a contact inquiry.
///
/// POST /api/contact
async fn create_inquiry(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactInquiry>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }

    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message is required".to_string()));
    }
    if message.len() > MAX_MESSAGE_LENGTH {
        return Err(AppError::BadRequest(format!(
            "message exceeds {MAX_MESSAGE_LENGTH} characters"
        )));
    }

    let email = Email::parse(&request.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let repo = ContentRepository::new(state.pool());
    let inquiry = repo.create_inquiry(name, &email, message).await?;

    Ok((StatusCode::CREATED, Json(inquiry)))
}
