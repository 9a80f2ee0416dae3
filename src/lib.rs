//! Huginn - Resilient LLM orchestration core for self-healing data pipelines
//!
//! This crate turns an unreliable, non-deterministic, rate-limited model
//! API into a safe, cacheable, retryable building block:
//!
//! - a [`ModelProvider`] trait with interchangeable backends whose
//!   structured-output dialects are reconciled by per-vendor schema
//!   adapters,
//! - a deterministic [`ResponseCache`](cache::ResponseCache) for
//!   temperature-zero calls,
//! - a retry-with-regeneration controller ([`retry`]) that feeds errors
//!   back into the conversation and escalates temperature,
//! - a single-flight [`DedupQueue`] for fire-and-forget background work.
//!
//! # Example
//!
//! ```rust,no_run
//! use huginn::{Huginn, Message, RetryPolicy, Schema, retry};
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let gateway = Huginn::builder()
//!         .openai("sk-your-key")
//!         .model("gpt-4o-mini")
//!         .build()?;
//!
//!     let schema = Schema::object()
//!         .property("endpoint", Schema::string())
//!         .optional("auth_header", Schema::string());
//!
//!     let output = retry::regenerate_object(
//!         &gateway,
//!         &[
//!             Message::system("You generate data-access configurations."),
//!             Message::user("Configure access to the orders feed."),
//!         ],
//!         &schema,
//!         &RetryPolicy::default(),
//!         |value| {
//!             value
//!                 .get("endpoint")
//!                 .and_then(|v| v.as_str())
//!                 .filter(|s| !s.is_empty())
//!                 .map(|_| ())
//!                 .ok_or_else(|| "endpoint must be a non-empty string".into())
//!         },
//!     )
//!     .await?;
//!
//!     println!("{}", output.response);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod queue;
pub mod retry;
pub mod sanitize;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache};
pub use config::{Config, ProviderKind};
pub use error::{HuginnError, Result};
pub use gateway::{Gateway, Huginn, HuginnBuilder};
pub use providers::{GeminiProvider, ModelProvider, OpenAiProvider};
pub use queue::DedupQueue;
pub use retry::RetryPolicy;
pub use types::{Message, ObjectOutput, Role, Schema, TextOutput};
