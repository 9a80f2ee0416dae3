//! Backend model providers and vendor schema adapters

pub(crate) mod adapter;
mod gemini;
mod openai;
pub(crate) mod parse;
pub mod traits;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use traits::ModelProvider;

use crate::types::{Message, Role};

/// Inject the temporal anchor into the dispatch copy of a history.
///
/// The line is appended to the leading system message, or prepended as a
/// new system message when there is none, so the model has a stable "now"
/// independent of its training cutoff. Only the wire copy is touched; the
/// history returned to callers never carries the anchor.
pub(crate) fn with_date_anchor(messages: &[Message]) -> Vec<Message> {
    let anchor = format!("Current date: {}", chrono::Utc::now().format("%Y-%m-%d"));
    let mut out: Vec<Message> = messages.to_vec();
    match out.first_mut() {
        Some(first) if first.role == Role::System => {
            first.content = format!("{}\n\n{anchor}", first.content);
        }
        _ => out.insert(0, Message::system(anchor)),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_appends_to_existing_system_message() {
        let messages = [Message::system("You are terse."), Message::user("hi")];
        let anchored = with_date_anchor(&messages);
        assert_eq!(anchored.len(), 2);
        assert!(anchored[0].content.starts_with("You are terse."));
        assert!(anchored[0].content.contains("Current date: "));
    }

    #[test]
    fn anchor_prepends_when_no_system_message() {
        let messages = [Message::user("hi")];
        let anchored = with_date_anchor(&messages);
        assert_eq!(anchored.len(), 2);
        assert_eq!(anchored[0].role, Role::System);
        assert!(anchored[0].content.starts_with("Current date: "));
    }

    #[test]
    fn anchor_does_not_touch_the_input() {
        let messages = [Message::system("sys")];
        let _ = with_date_anchor(&messages);
        assert_eq!(messages[0].content, "sys");
    }
}
