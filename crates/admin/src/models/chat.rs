//! Chat conversation models, read-only in the back-office.

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

/// A conversation with its message count, as the review list shows it.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub message_count: i64,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: ChatRole,
    pub content: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
