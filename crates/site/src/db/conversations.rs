//! Persistence for chat widget conversations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use harvestline_core::{ChatRole, ConversationId, MessageId};

use super::RepositoryError;
use crate::models::{Conversation, ConversationMessage};

#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    id: i32,
    visitor_key: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Self {
            id: ConversationId::new(row.id),
            visitor_key: row.visitor_key,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConversationMessageRow {
    id: i32,
    conversation_id: i32,
    role: ChatRole,
    content: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl From<ConversationMessageRow> for ConversationMessage {
    fn from(row: ConversationMessageRow) -> Self {
        Self {
            id: MessageId::new(row.id),
            conversation_id: ConversationId::new(row.conversation_id),
            role: row.role,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// Repository for conversation persistence.
pub struct ConversationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ConversationRepository<'a> {
    /// Create a new conversation repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the conversation for a visitor key, creating it on first contact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, visitor_key: Uuid) -> Result<Conversation, RepositoryError> {
        // Upsert keyed on the visitor UUID; concurrent first messages from
        // the same widget resolve to one conversation row.
        let row = sqlx::query_as::<_, ConversationRow>(
            r"
            INSERT INTO conversation (visitor_key)
            VALUES ($1)
            ON CONFLICT (visitor_key)
            DO UPDATE SET updated_at = now()
            RETURNING id, visitor_key, created_at, updated_at
            ",
        )
        .bind(visitor_key)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Look up a conversation by visitor key without creating one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_visitor(
        &self,
        visitor_key: Uuid,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r"
            SELECT id, visitor_key, created_at, updated_at
            FROM conversation
            WHERE visitor_key = $1
            ",
        )
        .bind(visitor_key)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Append a message to a conversation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_message(
        &self,
        conversation_id: ConversationId,
        role: ChatRole,
        content: serde_json::Value,
    ) -> Result<ConversationMessage, RepositoryError> {
        let row = sqlx::query_as::<_, ConversationMessageRow>(
            r"
            INSERT INTO conversation_message (conversation_id, role, content)
            VALUES ($1, $2, $3)
            RETURNING id, conversation_id, role, content, created_at
            ",
        )
        .bind(conversation_id.as_i32())
        .bind(role)
        .bind(content)
        .fetch_one(self.pool)
        .await?;

        sqlx::query("UPDATE conversation SET updated_at = now() WHERE id = $1")
            .bind(conversation_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(row.into())
    }

    /// Get all messages in a conversation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<ConversationMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConversationMessageRow>(
            r"
            SELECT id, conversation_id, role, content, created_at
            FROM conversation_message
            WHERE conversation_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(conversation_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
