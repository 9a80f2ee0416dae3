//! Gateway wiring the provider to the response cache

mod builder;

pub use builder::{Huginn, HuginnBuilder};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::cache::ResponseCache;
use crate::providers::ModelProvider;
use crate::types::{Message, ObjectOutput, Schema, TextOutput};

/// Provider facade with deterministic response caching.
///
/// The cache is consulted before dispatch and populated after a
/// successful deterministic (temperature 0) call; this check/store is the
/// gateway's only shared-state interaction. `Gateway` itself implements
/// [`ModelProvider`], so the retry controller and external callers treat
/// it like any other provider.
pub struct Gateway {
    provider: Arc<dyn ModelProvider>,
    cache: ResponseCache,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

impl Gateway {
    pub(crate) fn new(provider: Arc<dyn ModelProvider>, cache: ResponseCache) -> Self {
        Self { provider, cache }
    }

    /// The response cache, for observability (`len`, `clear`).
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Free-text generation with cache check/store.
    pub async fn generate_text(&self, messages: &[Message], temperature: f32) -> Result<TextOutput> {
        if let Some(Value::String(cached)) = self.cache.get(messages, temperature, None) {
            let mut history = messages.to_vec();
            history.push(Message::assistant(&cached));
            return Ok(TextOutput {
                response: cached,
                messages: history,
            });
        }
        let output = self.provider.generate_text(messages, temperature).await?;
        self.cache.set(
            messages,
            temperature,
            Value::String(output.response.clone()),
            None,
        );
        Ok(output)
    }

    /// Schema-constrained generation with cache check/store.
    ///
    /// On a cache hit the reply is still appended to the returned history,
    /// carrying the cached value re-serialized.
    pub async fn generate_object(
        &self,
        messages: &[Message],
        schema: &Schema,
        temperature: f32,
    ) -> Result<ObjectOutput> {
        if let Some(cached) = self.cache.get(messages, temperature, Some(schema)) {
            let mut history = messages.to_vec();
            history.push(Message::assistant(cached.to_string()));
            return Ok(ObjectOutput {
                response: cached,
                messages: history,
            });
        }
        let output = self
            .provider
            .generate_object(messages, schema, temperature)
            .await?;
        self.cache
            .set(messages, temperature, output.response.clone(), Some(schema));
        Ok(output)
    }
}

#[async_trait]
impl ModelProvider for Gateway {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn generate_text(&self, messages: &[Message], temperature: f32) -> Result<TextOutput> {
        Gateway::generate_text(self, messages, temperature).await
    }

    async fn generate_object(
        &self,
        messages: &[Message],
        schema: &Schema,
        temperature: f32,
    ) -> Result<ObjectOutput> {
        Gateway::generate_object(self, messages, schema, temperature).await
    }
}
