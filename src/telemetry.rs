//! Telemetry metric name constants.
//!
//! Centralised metric names for huginn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider` — provider name (e.g. "openai", "gemini")
//! - `operation` — capability invoked ("generate_text" | "generate_object")
//! - `queue` — dedup queue name

/// Total model requests dispatched.
///
/// Labels: `provider`, `operation`.
pub const REQUESTS_TOTAL: &str = "huginn_requests_total";

/// Model request duration in seconds.
///
/// Labels: `provider`, `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "huginn_request_duration_seconds";

/// Total regeneration attempts beyond the initial request.
///
/// Labels: `operation`.
pub const RETRIES_TOTAL: &str = "huginn_retries_total";

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "huginn_cache_hits_total";

/// Total response cache misses.
pub const CACHE_MISSES_TOTAL: &str = "huginn_cache_misses_total";

/// Total jobs accepted by a dedup queue (duplicates excluded).
///
/// Labels: `queue`.
pub const JOBS_TOTAL: &str = "huginn_jobs_total";

/// Total jobs whose task settled with an error.
///
/// Labels: `queue`.
pub const JOB_FAILURES_TOTAL: &str = "huginn_job_failures_total";
