//! Read and delete access to chat conversations.
//!
//! Conversations are written by the public site's chat flow; the back-office
//! reviews and prunes them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use harvestline_core::{ChatRole, ConversationId, MessageId};

use super::RepositoryError;
use crate::models::{Conversation, ConversationMessage, ConversationSummary};

#[derive(Debug, sqlx::FromRow)]
struct ConversationSummaryRow {
    id: i32,
    visitor_key: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    message_count: i64,
}

impl From<ConversationSummaryRow> for ConversationSummary {
    fn from(row: ConversationSummaryRow) -> Self {
        Self {
            conversation: Conversation {
                id: ConversationId::new(row.id),
                visitor_key: row.visitor_key,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            message_count: row.message_count,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i32,
    conversation_id: i32,
    role: ChatRole,
    content: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for ConversationMessage {
    fn from(row: MessageRow) -> Self {
        Self {
            id: MessageId::new(row.id),
            conversation_id: ConversationId::new(row.conversation_id),
            role: row.role,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// Repository for conversation review.
pub struct ConversationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ConversationRepository<'a> {
    /// Create a new conversation repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List conversations with message counts, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConversationSummaryRow>(
            r"
            SELECT c.id, c.visitor_key, c.created_at, c.updated_at,
                   count(m.id) AS message_count
            FROM conversation c
            LEFT JOIN conversation_message m ON m.conversation_id = c.id
            GROUP BY c.id
            ORDER BY c.updated_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a conversation's messages in chronological order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such conversation exists.
    pub async fn get_messages(
        &self,
        id: ConversationId,
    ) -> Result<Vec<ConversationMessage>, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM conversation WHERE id = $1)")
                .bind(id.as_i32())
                .fetch_one(self.pool)
                .await?;
        if !exists {
            return Err(RepositoryError::NotFound);
        }

        let rows = sqlx::query_as::<_, MessageRow>(
            r"
            SELECT id, conversation_id, role, content, created_at
            FROM conversation_message
            WHERE conversation_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Delete a conversation and its messages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such conversation exists.
    pub async fn delete(&self, id: ConversationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM conversation WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count all conversations (analytics snapshot seed).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM conversation")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Count all chat messages (analytics snapshot seed).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_messages(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM conversation_message")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
