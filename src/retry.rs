//! Retry-with-regeneration controller.
//!
//! Drives a generation call to a valid result despite transient failures
//! and structurally invalid model output. Each failed attempt feeds its
//! error back into the conversation as a user message and escalates the
//! sampling temperature, so a deterministic failure mode has a chance to
//! break on the next attempt. This loop is the mechanism behind the
//! system's self-healing behavior; external callers reuse it with their
//! own validators and larger attempt bounds.
//!
//! Attempts are strictly sequential — attempt `n+1` starts from the
//! history attempt `n` produced, error feedback included.

use serde_json::Value;
use tracing::warn;

use crate::providers::ModelProvider;
use crate::sanitize::sanitize_string_list;
use crate::telemetry;
use crate::types::{Message, ObjectOutput, Schema, TextOutput};
use crate::{HuginnError, Result};

/// Configuration for the regeneration loop.
///
/// Attempt 0 always runs at temperature 0 (keeping it cacheable); retry
/// `n` runs at `min(temperature_step * n, max_temperature)`.
///
/// ```rust
/// # use huginn::RetryPolicy;
/// let policy = RetryPolicy::new().max_attempts(5);
/// assert_eq!(policy.temperature_for(0), 0.0);
/// assert_eq!(policy.temperature_for(2), 0.6);
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Temperature increase per retry. Default: 0.3.
    pub temperature_step: f32,
    /// Cap on the escalated temperature. Default: 1.0.
    pub max_temperature: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            temperature_step: 0.3,
            max_temperature: 1.0,
        }
    }
}

impl RetryPolicy {
    /// Create a new policy with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the temperature increase per retry.
    pub fn temperature_step(mut self, step: f32) -> Self {
        self.temperature_step = step;
        self
    }

    /// Set the temperature cap.
    pub fn max_temperature(mut self, max: f32) -> Self {
        self.max_temperature = max;
        self
    }

    /// Sampling temperature for a given attempt number (0-indexed).
    pub fn temperature_for(&self, attempt: u32) -> f32 {
        (self.temperature_step * attempt as f32).min(self.max_temperature)
    }
}

/// Drive a structured generation call until the validator accepts it.
///
/// Provider/parse errors and validation rejections are handled the same
/// way: the failure text is appended to the history as a user message,
/// the temperature escalates, and the call is reissued. Once the attempt
/// bound is reached, the last failure surfaces as
/// [`HuginnError::ExhaustedRetries`] — never a degraded result.
pub async fn regenerate_object<V>(
    provider: &dyn ModelProvider,
    messages: &[Message],
    schema: &Schema,
    policy: &RetryPolicy,
    validate: V,
) -> Result<ObjectOutput>
where
    V: Fn(&Value) -> std::result::Result<(), String>,
{
    let mut history = messages.to_vec();
    let mut last_err: Option<HuginnError> = None;

    for attempt in 0..policy.max_attempts {
        let temperature = policy.temperature_for(attempt);
        if attempt > 0 {
            metrics::counter!(telemetry::RETRIES_TOTAL, "operation" => "generate_object")
                .increment(1);
        }
        match provider.generate_object(&history, schema, temperature).await {
            Ok(output) => match validate(&output.response) {
                Ok(()) => return Ok(output),
                Err(reason) => {
                    warn!(attempt, temperature, %reason, "output failed validation, regenerating");
                    history = output.messages;
                    history.push(feedback_message(&reason));
                    last_err = Some(HuginnError::Validation(reason));
                }
            },
            Err(error) => {
                warn!(attempt, temperature, %error, "generation attempt failed, regenerating");
                history.push(feedback_message(&error.to_string()));
                last_err = Some(error);
            }
        }
    }

    Err(exhausted(policy.max_attempts, last_err))
}

/// Drive a free-text generation call until the validator accepts it.
pub async fn regenerate_text<V>(
    provider: &dyn ModelProvider,
    messages: &[Message],
    policy: &RetryPolicy,
    validate: V,
) -> Result<TextOutput>
where
    V: Fn(&str) -> std::result::Result<(), String>,
{
    let mut history = messages.to_vec();
    let mut last_err: Option<HuginnError> = None;

    for attempt in 0..policy.max_attempts {
        let temperature = policy.temperature_for(attempt);
        if attempt > 0 {
            metrics::counter!(telemetry::RETRIES_TOTAL, "operation" => "generate_text")
                .increment(1);
        }
        match provider.generate_text(&history, temperature).await {
            Ok(output) => match validate(&output.response) {
                Ok(()) => return Ok(output),
                Err(reason) => {
                    warn!(attempt, temperature, %reason, "output failed validation, regenerating");
                    history = output.messages;
                    history.push(feedback_message(&reason));
                    last_err = Some(HuginnError::Validation(reason));
                }
            },
            Err(error) => {
                warn!(attempt, temperature, %error, "generation attempt failed, regenerating");
                history.push(feedback_message(&error.to_string()));
                last_err = Some(error);
            }
        }
    }

    Err(exhausted(policy.max_attempts, last_err))
}

/// Generate a sanitized list of strings.
///
/// Requests an array-of-strings schema, then passes the structurally
/// valid result through the sanitizer. Zero usable items after sanitation
/// counts as a retryable failure (logged, fed back), distinct from a hard
/// provider error.
pub async fn regenerate_string_list(
    provider: &dyn ModelProvider,
    messages: &[Message],
    policy: &RetryPolicy,
) -> Result<Vec<String>> {
    let schema = Schema::array(Schema::string());
    let mut history = messages.to_vec();
    let mut last_err: Option<HuginnError> = None;

    for attempt in 0..policy.max_attempts {
        let temperature = policy.temperature_for(attempt);
        if attempt > 0 {
            metrics::counter!(telemetry::RETRIES_TOTAL, "operation" => "generate_string_list")
                .increment(1);
        }
        match provider.generate_object(&history, &schema, temperature).await {
            Ok(output) => {
                let items = sanitize_string_list(&output.response);
                if !items.is_empty() {
                    return Ok(items);
                }
                let reason = "response contained no usable items after sanitation";
                warn!(attempt, temperature, reason, "regenerating");
                history = output.messages;
                history.push(feedback_message(reason));
                last_err = Some(HuginnError::Validation(reason.to_string()));
            }
            Err(error) => {
                warn!(attempt, temperature, %error, "generation attempt failed, regenerating");
                history.push(feedback_message(&error.to_string()));
                last_err = Some(error);
            }
        }
    }

    Err(exhausted(policy.max_attempts, last_err))
}

fn feedback_message(reason: &str) -> Message {
    Message::user(format!(
        "The previous response was not usable: {reason}. \
         Produce a corrected response that satisfies the request."
    ))
}

fn exhausted(attempts: u32, last_err: Option<HuginnError>) -> HuginnError {
    HuginnError::ExhaustedRetries {
        attempts,
        last: Box::new(last_err.unwrap_or(HuginnError::EmptyResponse)),
    }
}
