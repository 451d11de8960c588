//! Model API client for chat interactions.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::LlmConfig;

use super::error::{ApiErrorResponse, LlmError};
use super::types::{ChatRequest, ChatResponse, Message, MessageContent, Tool};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const COMPLETION_MAX_TOKENS: u32 = 64;

/// Model API client.
///
/// Cheap to clone; the HTTP client and configuration live behind an `Arc`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<LlmClientInner>,
}

struct LlmClientInner {
    client: reqwest::Client,
    model: String,
    classifier_model: String,
}

impl LlmClient {
    /// Create a new model API client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &LlmConfig) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).expect("Invalid API key for header"),
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(LlmClientInner {
                client,
                model: config.model.clone(),
                classifier_model: config.classifier_model.clone(),
            }),
        }
    }

    /// Send a chat request and get a complete response.
    ///
    /// This is the call the conversation handlers use inside the tool-use
    /// loop: the full response is needed before deciding whether to execute
    /// tools and continue.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, messages, tools), fields(model = %self.inner.model))]
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatResponse, LlmError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages,
            system,
            tools,
            temperature: None,
        };

        let response = self
            .inner
            .client
            .post(ANTHROPIC_API_URL)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Run a short deterministic completion on the classifier model.
    ///
    /// Temperature is pinned to 0 and the token budget is tiny; this is for
    /// single-label outputs (intent classification, animal type extraction),
    /// not prose.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, system, user), fields(model = %self.inner.classifier_model))]
    pub async fn completion(
        &self,
        system: Option<String>,
        user: &str,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.inner.classifier_model.clone(),
            max_tokens: COMPLETION_MAX_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: MessageContent::Text(user.to_string()),
            }],
            system,
            tools: None,
            temperature: Some(0.0),
        };

        let response = self
            .inner
            .client
            .post(ANTHROPIC_API_URL)
            .json(&request)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        Ok(response.text())
    }

    /// Handle a response, parsing the body or mapping the error status.
    async fn handle_response(&self, response: reqwest::Response) -> Result<ChatResponse, LlmError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| LlmError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(Self::handle_error_status(status, response).await)
        }
    }

    /// Handle an error status code.
    async fn handle_error_status(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> LlmError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return LlmError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return LlmError::Unauthorized("Invalid API key".to_string());
        }

        match response.text().await {
            Ok(body) => {
                if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                    LlmError::Api {
                        error_type: api_error.error.error_type,
                        message: api_error.error.message,
                    }
                } else {
                    LlmError::Api {
                        error_type: "unknown".to_string(),
                        message: body,
                    }
                }
            }
            Err(e) => LlmError::Http(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<LlmClient>();
    }

    #[test]
    fn test_llm_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LlmClient>();
    }
}
