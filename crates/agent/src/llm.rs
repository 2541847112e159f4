use std::time::{Duration, Instant};

use async_trait::async_trait;
use intake_core::config::LlmConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub max_tokens: u32,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm.api_key is not configured")]
    MissingApiKey,
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("could not reach generation service: {0}")]
    Transport(String),
    #[error("generation service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode generation response: {0}")]
    Decode(String),
    #[error("generation service returned no content")]
    EmptyResponse,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// OpenAI-compatible `chat/completions` client (OpenRouter by default).
///
/// One attempt per call, no retries.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
    app_title: String,
    referer: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = match &config.api_key {
            Some(key) if !key.expose_secret().trim().is_empty() => key.clone(),
            _ => return Err(LlmError::MissingApiKey),
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|error| LlmError::Client(error.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.chat_completions_url(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            app_title: config.app_title.clone(),
            referer: config.referer.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system_prompt },
                ChatMessage { role: "user", content: &request.user_message },
            ],
            temperature: self.temperature,
            max_tokens: request.max_tokens,
        };

        let started = Instant::now();
        let mut builder = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .header("X-Title", &self.app_title)
            .json(&body);
        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }

        let response =
            builder.send().await.map_err(|error| LlmError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(LlmError::Status { status: status.as_u16(), message });
        }

        let payload: ChatResponse =
            response.json().await.map_err(|error| LlmError::Decode(error.to_string()))?;
        debug!(
            event_name = "agent.llm.completed",
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generation call completed"
        );
        extract_content(payload)
    }
}

/// First choice's message content, trimmed. Empty or missing content is an error.
pub(crate) fn extract_content(payload: ChatResponse) -> Result<String, LlmError> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(LlmError::EmptyResponse)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use intake_core::config::AppConfig;
    use serde_json::json;

    use super::{
        extract_content, ChatCompletionsClient, ChatResponse, CompletionRequest, LlmClient,
        LlmError,
    };

    fn parse(value: serde_json::Value) -> ChatResponse {
        serde_json::from_value(value).expect("valid response shape")
    }

    #[test]
    fn content_is_trimmed() {
        let payload = parse(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Hi Ana!\n" } }]
        }));
        assert_eq!(extract_content(payload).expect("content"), "Hi Ana!");
    }

    #[test]
    fn missing_or_blank_content_is_empty_response() {
        for payload in [
            json!({ "choices": [] }),
            json!({}),
            json!({ "choices": [{ "message": null }] }),
            json!({ "choices": [{ "message": { "content": "   " } }] }),
        ] {
            assert!(matches!(extract_content(parse(payload)), Err(LlmError::EmptyResponse)));
        }
    }

    #[test]
    fn client_requires_api_key() {
        let config = AppConfig::default();
        assert!(matches!(ChatCompletionsClient::new(&config.llm), Err(LlmError::MissingApiKey)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-test".to_string().into());
        config.llm.base_url = "http://127.0.0.1:9/v1".to_string();
        config.llm.timeout_secs = 2;

        let client = ChatCompletionsClient::new(&config.llm).expect("client builds");
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/v1/chat/completions");

        let result = client
            .complete(&CompletionRequest {
                system_prompt: "system".to_string(),
                user_message: "hello".to_string(),
                max_tokens: 10,
            })
            .await;
        assert!(matches!(result, Err(LlmError::Transport(_))));
    }
}
