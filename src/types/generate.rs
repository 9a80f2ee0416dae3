//! Generation result types

use serde_json::Value;

use super::Message;

/// Result of a free-text generation call.
///
/// `messages` is the input history extended with the model's reply as a
/// new assistant message; the input slice itself is never mutated.
#[derive(Debug, Clone)]
pub struct TextOutput {
    pub response: String,
    pub messages: Vec<Message>,
}

/// Result of a schema-constrained generation call.
#[derive(Debug, Clone)]
pub struct ObjectOutput {
    pub response: Value,
    pub messages: Vec<Message>,
}
