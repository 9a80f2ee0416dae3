//! Provider trait for backend model APIs.
//!
//! Backends implement [`ModelProvider`]; shared concerns (caching, retry
//! with regeneration) live in decorators and controllers around the trait
//! rather than inside each implementation.

use async_trait::async_trait;

use crate::Result;
use crate::types::{Message, ObjectOutput, Schema, TextOutput};

/// A backend model API capable of free-text and schema-constrained
/// generation.
///
/// Both operations return the input history extended with the model's
/// reply as a new assistant message; the input slice is never mutated.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Free-text generation.
    async fn generate_text(&self, messages: &[Message], temperature: f32) -> Result<TextOutput>;

    /// Schema-constrained generation.
    ///
    /// The caller's schema is translated to the vendor's structured-output
    /// dialect before dispatch; the reply is parsed defensively (prose
    /// stripped) and a parse failure is a hard error.
    async fn generate_object(
        &self,
        messages: &[Message],
        schema: &Schema,
        temperature: f32,
    ) -> Result<ObjectOutput>;
}
