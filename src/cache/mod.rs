//! Deterministic response caching

mod response;

pub use response::{CacheConfig, ResponseCache};
