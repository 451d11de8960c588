//! Chat conversation review routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use harvestline_core::ConversationId;

use crate::db::ConversationRepository;
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, ensure_can_write};
use crate::models::{ConversationMessage, ConversationSummary};
use crate::state::AppState;

/// Build the conversation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/conversations", get(list_conversations))
        .route(
            "/api/conversations/{id}",
            get(get_conversation).delete(delete_conversation),
        )
}

/// List conversations, most recently active first.
///
/// GET /api/conversations
async fn list_conversations(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ConversationSummary>>, AppError> {
    let repo = ConversationRepository::new(state.pool());
    Ok(Json(repo.list().await?))
}

/// Get a conversation's full transcript.
///
/// GET /api/conversations/:id
async fn get_conversation(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ConversationMessage>>, AppError> {
    let repo = ConversationRepository::new(state.pool());
    let messages = repo
        .get_messages(ConversationId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("conversation {id}"), e))?;
    Ok(Json(messages))
}

/// Delete a conversation and its messages.
///
/// DELETE /api/conversations/:id
async fn delete_conversation(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ensure_can_write(&admin)?;

    let repo = ConversationRepository::new(state.pool());
    repo.delete(ConversationId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("conversation {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}
