//! Orchestration of the chat widget flow.
//!
//! The service owns the full round trip: persist the visitor's message,
//! classify it, run the matching handler, and persist everything the model
//! produced so the conversation replays correctly on the next turn.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use harvestline_core::nutrition::IngredientScore;
use harvestline_core::{ChatIntent, ChatRole, ConversationId};

use crate::config::BusinessConfig;
use crate::db::{ConversationRepository, RepositoryError};
use crate::llm::{ContentBlock, LlmClient, LlmError, Message, MessageContent, StopReason};
use crate::models::ConversationMessage;

use super::executor::ToolExecutor;
use super::formulation;
use super::intent::classify;
use super::prompts::system_prompt;
use super::tools::tools_for_intent;

/// Maximum number of tool use iterations to prevent infinite loops.
const MAX_TOOL_ITERATIONS: usize = 10;

/// Errors that can occur while handling a chat turn.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Model API error.
    #[error("assistant error: {0}")]
    Llm(#[from] LlmError),

    /// Too many tool iterations (possible infinite loop).
    #[error("too many tool iterations")]
    TooManyToolIterations,
}

/// Everything the widget needs to render one completed chat turn.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub conversation_id: ConversationId,
    pub intent: ChatIntent,
    /// The assistant's visible reply text.
    pub reply: String,
    /// Animal type the formulation handler extracted, if it ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal_type: Option<String>,
    /// Ranked ingredient recommendations from the formulation handler.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommended_ingredients: Vec<IngredientScore>,
    /// All messages persisted during this turn, in order.
    pub messages: Vec<ConversationMessage>,
}

/// Service orchestrating chat widget conversations.
pub struct ChatService<'a> {
    pool: &'a PgPool,
    llm: &'a LlmClient,
    business: &'a BusinessConfig,
}

impl<'a> ChatService<'a> {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, llm: &'a LlmClient, business: &'a BusinessConfig) -> Self {
        Self {
            pool,
            llm,
            business,
        }
    }

    /// Get the message history for a visitor, if they have a conversation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_history(
        &self,
        visitor_key: Uuid,
    ) -> Result<Option<Vec<ConversationMessage>>, ChatError> {
        let repo = ConversationRepository::new(self.pool);
        match repo.find_by_visitor(visitor_key).await? {
            None => Ok(None),
            Some(conversation) => Ok(Some(repo.get_messages(conversation.id).await?)),
        }
    }

    /// Handle one visitor message end to end.
    ///
    /// The message is persisted, classified, and routed to a handler. Tool
    /// calls and their results are persisted alongside the visible turns so
    /// history replays include them.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence or the model call fails. Classifier
    /// failures do not error; they route to the sales handler.
    #[instrument(skip(self, user_message), fields(visitor_key = %visitor_key))]
    pub async fn send_message(
        &self,
        visitor_key: Uuid,
        user_message: &str,
    ) -> Result<ChatReply, ChatError> {
        let repo = ConversationRepository::new(self.pool);
        let conversation = repo.get_or_create(visitor_key).await?;

        let user_content = serde_json::json!({ "text": user_message });
        let user_msg = repo
            .add_message(conversation.id, ChatRole::User, user_content)
            .await?;

        let mut new_messages = vec![user_msg];

        let history = repo.get_messages(conversation.id).await?;
        let api_messages = convert_to_messages(&history);

        let intent = classify(self.llm, user_message).await;
        info!(intent = %intent, conversation_id = %conversation.id, "Routing chat message");

        if intent == ChatIntent::FormulationAdvice {
            let outcome = formulation::handle(
                self.llm,
                self.pool,
                self.business,
                api_messages,
                user_message,
            )
            .await?;

            let content = serde_json::json!({ "text": outcome.advice });
            let msg = repo
                .add_message(conversation.id, ChatRole::Assistant, content)
                .await?;
            new_messages.push(msg);

            return Ok(ChatReply {
                conversation_id: conversation.id,
                intent,
                reply: outcome.advice,
                animal_type: Some(outcome.animal_type),
                recommended_ingredients: outcome.recommendations,
                messages: new_messages,
            });
        }

        let reply = self
            .run_tool_loop(&repo, conversation.id, intent, api_messages, &mut new_messages)
            .await?;

        Ok(ChatReply {
            conversation_id: conversation.id,
            intent,
            reply,
            animal_type: None,
            recommended_ingredients: Vec::new(),
            messages: new_messages,
        })
    }

    /// Run the bounded tool-use loop for the product and sales handlers.
    ///
    /// Returns the concatenated visible reply text.
    async fn run_tool_loop(
        &self,
        repo: &ConversationRepository<'_>,
        conversation_id: ConversationId,
        intent: ChatIntent,
        mut api_messages: Vec<Message>,
        new_messages: &mut Vec<ConversationMessage>,
    ) -> Result<String, ChatError> {
        let tools = tools_for_intent(intent);
        let system = system_prompt(intent, self.business);
        let executor = ToolExecutor::new(self.pool, self.business);

        let mut reply_parts: Vec<String> = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > MAX_TOOL_ITERATIONS {
                warn!("Too many tool iterations, stopping");
                return Err(ChatError::TooManyToolIterations);
            }

            let response = self
                .llm
                .chat(
                    api_messages.clone(),
                    Some(system.clone()),
                    Some(tools.clone()),
                )
                .await?;

            info!(
                stop_reason = ?response.stop_reason,
                content_blocks = response.content.len(),
                "Assistant response received"
            );

            let mut has_tool_use = false;
            let mut tool_results: Vec<ContentBlock> = Vec::new();

            for block in &response.content {
                match block {
                    ContentBlock::Text { text } => {
                        let content = serde_json::json!({ "text": text });
                        let msg = repo
                            .add_message(conversation_id, ChatRole::Assistant, content)
                            .await?;
                        new_messages.push(msg);
                        reply_parts.push(text.clone());
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        has_tool_use = true;

                        let tool_use_content = serde_json::json!({
                            "id": id,
                            "name": name,
                            "input": input
                        });
                        let msg = repo
                            .add_message(conversation_id, ChatRole::ToolUse, tool_use_content)
                            .await?;
                        new_messages.push(msg);

                        // Tool failures feed back as error results; the model
                        // relays them instead of the turn aborting
                        let (result_content, is_error) =
                            match executor.execute(name, input).await {
                                Ok(r) => (r, false),
                                Err(e) => (format!("Error: {e}"), true),
                            };

                        let tool_result_content = serde_json::json!({
                            "tool_use_id": id,
                            "content": result_content,
                            "is_error": is_error
                        });
                        let msg = repo
                            .add_message(conversation_id, ChatRole::ToolResult, tool_result_content)
                            .await?;
                        new_messages.push(msg);

                        tool_results.push(ContentBlock::ToolResult {
                            tool_use_id: id.clone(),
                            content: result_content,
                            is_error: Some(is_error),
                        });
                    }
                    ContentBlock::ToolResult { .. } => {
                        // Not expected in responses
                    }
                }
            }

            if has_tool_use && response.stop_reason == Some(StopReason::ToolUse) {
                api_messages.push(Message {
                    role: "assistant".to_string(),
                    content: MessageContent::Blocks(response.content.clone()),
                });
                api_messages.push(Message {
                    role: "user".to_string(),
                    content: MessageContent::Blocks(tool_results),
                });
                continue;
            }

            break;
        }

        Ok(reply_parts.join("\n\n"))
    }
}

/// State for flattening stored messages into API message format.
struct MessageBuilder {
    result: Vec<Message>,
    assistant_blocks: Vec<ContentBlock>,
    tool_results: Vec<ContentBlock>,
}

impl MessageBuilder {
    const fn new() -> Self {
        Self {
            result: Vec::new(),
            assistant_blocks: Vec::new(),
            tool_results: Vec::new(),
        }
    }

    fn flush_assistant_blocks(&mut self) {
        if !self.assistant_blocks.is_empty() {
            self.result.push(Message {
                role: "assistant".to_string(),
                content: MessageContent::Blocks(std::mem::take(&mut self.assistant_blocks)),
            });
        }
    }

    fn flush_tool_results(&mut self) {
        if !self.tool_results.is_empty() {
            self.result.push(Message {
                role: "user".to_string(),
                content: MessageContent::Blocks(std::mem::take(&mut self.tool_results)),
            });
        }
    }

    fn add_user_message(&mut self, msg: &ConversationMessage) {
        self.flush_assistant_blocks();
        self.flush_tool_results();

        let text = get_json_str(&msg.content, "text");
        self.result.push(Message {
            role: "user".to_string(),
            content: MessageContent::Text(text),
        });
    }

    fn add_assistant_message(&mut self, msg: &ConversationMessage) {
        self.flush_tool_results();

        let text = get_json_str(&msg.content, "text");
        self.assistant_blocks.push(ContentBlock::Text { text });
    }

    fn add_tool_use(&mut self, msg: &ConversationMessage) {
        self.flush_tool_results();

        let id = get_json_str(&msg.content, "id");
        let name = get_json_str(&msg.content, "name");
        let input = msg
            .content
            .get("input")
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        self.assistant_blocks
            .push(ContentBlock::ToolUse { id, name, input });
    }

    fn add_tool_result(&mut self, msg: &ConversationMessage) {
        self.flush_assistant_blocks();

        let tool_use_id = get_json_str(&msg.content, "tool_use_id");
        let content = get_json_str(&msg.content, "content");
        let is_error = msg
            .content
            .get("is_error")
            .and_then(serde_json::Value::as_bool);

        self.tool_results.push(ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        });
    }

    fn finish(mut self) -> Vec<Message> {
        self.flush_assistant_blocks();
        self.flush_tool_results();
        self.result
    }
}

/// Extract a string from JSON content, returning empty string if not found.
fn get_json_str(content: &serde_json::Value, key: &str) -> String {
    content
        .get(key)
        .and_then(serde_json::Value::as_str)
        .unwrap_or("")
        .to_string()
}

/// Flatten stored messages into API message format.
///
/// Consecutive assistant text and tool use rows collapse into one assistant
/// message of blocks; consecutive tool results collapse into one user
/// message, matching what the API expects after a tool turn.
fn convert_to_messages(messages: &[ConversationMessage]) -> Vec<Message> {
    let mut builder = MessageBuilder::new();

    for msg in messages {
        match msg.role {
            ChatRole::User => builder.add_user_message(msg),
            ChatRole::Assistant => builder.add_assistant_message(msg),
            ChatRole::ToolUse => builder.add_tool_use(msg),
            ChatRole::ToolResult => builder.add_tool_result(msg),
        }
    }

    builder.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use harvestline_core::MessageId;

    fn stored(id: i32, role: ChatRole, content: serde_json::Value) -> ConversationMessage {
        ConversationMessage {
            id: MessageId::new(id),
            conversation_id: ConversationId::new(1),
            role,
            content,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_convert_plain_turns() {
        let history = vec![
            stored(1, ChatRole::User, serde_json::json!({"text": "Hi"})),
            stored(2, ChatRole::Assistant, serde_json::json!({"text": "Hello"})),
            stored(3, ChatRole::User, serde_json::json!({"text": "Prices?"})),
        ];

        let messages = convert_to_messages(&history);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].role, "user");
    }

    #[test]
    fn test_convert_collapses_tool_turns() {
        let history = vec![
            stored(1, ChatRole::User, serde_json::json!({"text": "Soybean price?"})),
            stored(
                2,
                ChatRole::ToolUse,
                serde_json::json!({"id": "tu_1", "name": "get_product", "input": {"name": "Soybean Meal"}}),
            ),
            stored(
                3,
                ChatRole::ToolResult,
                serde_json::json!({"tool_use_id": "tu_1", "content": "{}", "is_error": false}),
            ),
            stored(4, ChatRole::Assistant, serde_json::json!({"text": "It costs..."})),
        ];

        let messages = convert_to_messages(&history);
        // user text, assistant tool_use, user tool_result, assistant text
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].role, "user");
        assert!(matches!(messages[2].content, MessageContent::Blocks(_)));
        assert_eq!(messages[3].role, "assistant");
    }

    #[test]
    fn test_convert_groups_adjacent_assistant_blocks() {
        let history = vec![
            stored(1, ChatRole::User, serde_json::json!({"text": "Order please"})),
            stored(2, ChatRole::Assistant, serde_json::json!({"text": "Checking..."})),
            stored(
                3,
                ChatRole::ToolUse,
                serde_json::json!({"id": "tu_1", "name": "get_products", "input": {}}),
            ),
        ];

        let messages = convert_to_messages(&history);
        assert_eq!(messages.len(), 2);
        match &messages[1].content {
            MessageContent::Blocks(blocks) => assert_eq!(blocks.len(), 2),
            MessageContent::Text(_) => panic!("expected blocks"),
        }
    }

    #[test]
    fn test_get_json_str_missing_key() {
        let content = serde_json::json!({"text": "hi"});
        assert_eq!(get_json_str(&content, "text"), "hi");
        assert_eq!(get_json_str(&content, "other"), "");
    }
}
