//! Strict-mode vendor provider (OpenAI chat completions).
//!
//! Structured calls use the `json_schema` response format with
//! `strict: true`, which means the schema must first pass through
//! [`adapter::to_strict_schema`]: every property required, optionals
//! widened to nullable, `additionalProperties` forced off, pattern and
//! array-length constraints stripped, and a non-object root wrapped in a
//! synthetic single-key object that is unwound after parsing.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::providers::{adapter, parse, with_date_anchor};
use crate::telemetry;
use crate::types::{Message, ObjectOutput, Schema, TextOutput};
use crate::{HuginnError, Result};

use super::traits::ModelProvider;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Provider for the strict-mode vendor family.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create a new provider for the given model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_http_client(api_key, model, reqwest::Client::new())
    }

    /// Create a provider sharing an existing HTTP client.
    ///
    /// Prefer this over [`new`](Self::new) when multiple providers should
    /// share a connection pool (e.g. from the builder).
    pub fn with_http_client(
        api_key: impl Into<String>,
        model: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client,
        }
    }

    /// Override the API base URL (testing with wiremock).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn dispatch(&self, body: Value, operation: &'static str) -> Result<String> {
        let start = std::time::Instant::now();
        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".into());
            return Err(HuginnError::from_status(status.as_u16(), message));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => "openai", "operation" => operation)
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => "openai", "operation" => operation)
        .record(start.elapsed().as_secs_f64());

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(HuginnError::EmptyResponse)
    }
}

#[async_trait::async_trait]
impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(name = "openai.generate_text", skip(self, messages), fields(model = %self.model, temperature))]
    async fn generate_text(&self, messages: &[Message], temperature: f32) -> Result<TextOutput> {
        let wire = with_date_anchor(messages);
        debug!(
            input_chars = wire.iter().map(|m| m.content.len()).sum::<usize>(),
            "dispatching text generation"
        );
        let body = json!({
            "model": self.model,
            "messages": wire,
            "temperature": temperature,
        });
        let content = self.dispatch(body, "generate_text").await?;

        let mut history = messages.to_vec();
        history.push(Message::assistant(&content));
        Ok(TextOutput {
            response: content,
            messages: history,
        })
    }

    #[instrument(name = "openai.generate_object", skip(self, messages, schema), fields(model = %self.model, temperature))]
    async fn generate_object(
        &self,
        messages: &[Message],
        schema: &Schema,
        temperature: f32,
    ) -> Result<ObjectOutput> {
        let (vendor_schema, wrapped) = adapter::to_strict_schema(schema);
        let wire = with_date_anchor(messages);
        debug!(
            input_chars = wire.iter().map(|m| m.content.len()).sum::<usize>(),
            wrapped, "dispatching structured generation"
        );
        let body = json!({
            "model": self.model,
            "messages": wire,
            "temperature": temperature,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "response",
                    "strict": true,
                    "schema": vendor_schema,
                },
            },
        });
        let content = self.dispatch(body, "generate_object").await?;

        let mut value = parse::extract_json(&content)?;
        if wrapped {
            value = adapter::unwrap_root(value);
        }

        let mut history = messages.to_vec();
        history.push(Message::assistant(&content));
        Ok(ObjectOutput {
            response: value,
            messages: history,
        })
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
