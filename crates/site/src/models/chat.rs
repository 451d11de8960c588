//! Chat widget conversation models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use harvestline_core::{ChatRole, ConversationId, MessageId};

/// A chat widget conversation, keyed by the visitor's client-generated UUID.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub visitor_key: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single message in a conversation.
///
/// Content is role-shaped JSON: `{"text"}` for user/assistant turns,
/// `{"id","name","input"}` for tool use, `{"tool_use_id","content","is_error"}`
/// for tool results.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: ChatRole,
    pub content: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
