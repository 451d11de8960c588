//! Chat widget route handlers.
//!
//! The send endpoint is rate limited per client IP; model calls are the
//! expensive part of every request that lands here.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::{ChatError, ChatReply, ChatService};
use crate::config::RateLimitConfig;
use crate::middleware::chat_rate_limiter;
use crate::models::ConversationMessage;
use crate::state::AppState;

const MAX_MESSAGE_LENGTH: usize = 4_000;

/// Build the chat router.
pub fn router(rate_limit: &RateLimitConfig) -> Router<AppState> {
    Router::new()
        .route("/api/chat", post(send_message))
        .route_layer(chat_rate_limiter(rate_limit))
        .route("/api/chat/history/{visitor_key}", get(get_history))
}

/// Request to send a chat message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Client-generated UUID identifying the visitor's conversation.
    pub visitor_key: Uuid,
    pub message: String,
}

/// Response for the history endpoint.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<ConversationMessage>,
}

/// Chat API error response.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        // Server-side failures go to Sentry; the client gets a scrubbed message
        let (status, message) = match &self {
            Self::Database(_) => {
                sentry::capture_error(&self);
                tracing::error!(error = %self, "Chat request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Self::Llm(_) => (
                StatusCode::BAD_GATEWAY,
                "Assistant temporarily unavailable".to_string(),
            ),
            Self::TooManyToolIterations => {
                sentry::capture_error(&self);
                tracing::error!(error = %self, "Chat request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Request processing exceeded limits".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Send a chat message and get the completed turn back.
///
/// POST /api/chat
async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatReply>, Response> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(bad_request("message is required"));
    }
    if message.len() > MAX_MESSAGE_LENGTH {
        return Err(bad_request("message too long"));
    }

    let service = ChatService::new(state.pool(), state.llm(), state.config().business());
    let reply = service
        .send_message(request.visitor_key, message)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok(Json(reply))
}

/// Replay a visitor's conversation history.
///
/// GET /api/chat/history/:visitor_key
///
/// Visitors with no conversation yet get an empty list.
async fn get_history(
    State(state): State<AppState>,
    Path(visitor_key): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ChatError> {
    let service = ChatService::new(state.pool(), state.llm(), state.config().business());
    let messages = service.get_history(visitor_key).await?.unwrap_or_default();

    Ok(Json(HistoryResponse { messages }))
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
