//! Schema-stripping vendor provider (Gemini `generateContent`).
//!
//! The vendor rejects JSON-schema meta fields, so structured calls pass
//! the caller's schema through [`adapter::to_gemini_schema`] first:
//! `$schema` / `additionalProperties` / internal markers removed and every
//! property marked required, recursively. System messages travel in the
//! separate `systemInstruction` field and assistant turns use the
//! vendor's `model` role.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::providers::{adapter, parse, with_date_anchor};
use crate::telemetry;
use crate::types::{Message, ObjectOutput, Role, Schema, TextOutput};
use crate::{HuginnError, Result};

use super::traits::ModelProvider;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Provider for the schema-stripping vendor family.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new provider for the given model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_http_client(api_key, model, reqwest::Client::new())
    }

    /// Create a provider sharing an existing HTTP client.
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

    /// Split a history into the system instruction and conversation turns.
    fn wire_parts(messages: &[Message]) -> (Option<Value>, Vec<Value>) {
        let mut system_lines: Vec<&str> = Vec::new();
        let mut contents = Vec::new();
        for message in messages {
            match message.role {
                Role::System => system_lines.push(&message.content),
                Role::User => contents.push(json!({
                    "role": "user",
                    "parts": [{"text": message.content}],
                })),
                Role::Assistant => contents.push(json!({
                    "role": "model",
                    "parts": [{"text": message.content}],
                })),
            }
        }
        let system = (!system_lines.is_empty())
            .then(|| json!({"parts": [{"text": system_lines.join("\n\n")}]}));
        (system, contents)
    }

    async fn dispatch(&self, body: Value, operation: &'static str) -> Result<String> {
        let start = std::time::Instant::now();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .http_client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
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

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => "gemini", "operation" => operation)
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => "gemini", "operation" => operation)
        .record(start.elapsed().as_secs_f64());

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();
        if text.is_empty() {
            return Err(HuginnError::EmptyResponse);
        }
        Ok(text)
    }

    fn build_body(
        messages: &[Message],
        temperature: f32,
        response_schema: Option<Value>,
    ) -> Value {
        let (system, contents) = Self::wire_parts(messages);
        let mut generation_config = json!({"temperature": temperature});
        if let Some(schema) = response_schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = schema;
        }
        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if let Some(system) = system {
            body["systemInstruction"] = system;
        }
        body
    }
}

#[async_trait::async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(name = "gemini.generate_text", skip(self, messages), fields(model = %self.model, temperature))]
    async fn generate_text(&self, messages: &[Message], temperature: f32) -> Result<TextOutput> {
        let wire = with_date_anchor(messages);
        debug!(
            input_chars = wire.iter().map(|m| m.content.len()).sum::<usize>(),
            "dispatching text generation"
        );
        let body = Self::build_body(&wire, temperature, None);
        let content = self.dispatch(body, "generate_text").await?;

        let mut history = messages.to_vec();
        history.push(Message::assistant(&content));
        Ok(TextOutput {
            response: content,
            messages: history,
        })
    }

    #[instrument(name = "gemini.generate_object", skip(self, messages, schema), fields(model = %self.model, temperature))]
    async fn generate_object(
        &self,
        messages: &[Message],
        schema: &Schema,
        temperature: f32,
    ) -> Result<ObjectOutput> {
        let vendor_schema = adapter::to_gemini_schema(schema);
        let wire = with_date_anchor(messages);
        debug!(
            input_chars = wire.iter().map(|m| m.content.len()).sum::<usize>(),
            "dispatching structured generation"
        );
        let body = Self::build_body(&wire, temperature, Some(vendor_schema));
        let content = self.dispatch(body, "generate_object").await?;

        let value = parse::extract_json(&content)?;

        let mut history = messages.to_vec();
        history.push(Message::assistant(&content));
        Ok(ObjectOutput {
            response: value,
            messages: history,
        })
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
