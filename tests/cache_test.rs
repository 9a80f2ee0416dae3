use std::time::Duration;

use huginn::{CacheConfig, Message, ResponseCache, Schema};
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;

fn messages(text: &str) -> Vec<Message> {
    vec![Message::system("sys"), Message::user(text)]
}

#[tokio::test]
async fn set_then_get_round_trips() {
    let cache = ResponseCache::new(CacheConfig::default());
    let msgs = messages("hello");
    let schema = Schema::object().property("a", Schema::string());

    cache.set(&msgs, 0.0, json!({"a": "b"}), Some(&schema));
    assert_eq!(
        cache.get(&msgs, 0.0, Some(&schema)),
        Some(json!({"a": "b"}))
    );
}

#[tokio::test]
async fn untouched_key_misses() {
    let cache = ResponseCache::new(CacheConfig::default());
    assert_eq!(cache.get(&messages("never set"), 0.0, None), None);
}

#[tokio::test]
async fn non_deterministic_requests_are_never_cached() {
    let cache = ResponseCache::new(CacheConfig::default());
    let msgs = messages("hello");

    cache.set(&msgs, 0.7, json!("value"), None);
    assert_eq!(cache.get(&msgs, 0.7, None), None);
    assert_eq!(cache.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn entries_expire_lazily_after_max_age() {
    let cache = ResponseCache::new(CacheConfig::new().max_age(Duration::from_secs(60)));
    let msgs = messages("hello");

    cache.set(&msgs, 0.0, json!("value"), None);
    tokio::time::advance(Duration::from_secs(61)).await;

    assert_eq!(cache.get(&msgs, 0.0, None), None);
    // the expired entry was deleted by the read that discovered it
    assert_eq!(cache.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn entries_within_max_age_are_served() {
    let cache = ResponseCache::new(CacheConfig::new().max_age(Duration::from_secs(60)));
    let msgs = messages("hello");

    cache.set(&msgs, 0.0, json!("value"), None);
    tokio::time::advance(Duration::from_secs(59)).await;

    assert_eq!(cache.get(&msgs, 0.0, None), Some(json!("value")));
}

#[tokio::test(start_paused = true)]
async fn at_capacity_the_single_oldest_entry_is_evicted() {
    let cache = ResponseCache::new(CacheConfig::new().max_size(2));
    let k1 = messages("one");
    let k2 = messages("two");
    let k3 = messages("three");

    cache.set(&k1, 0.0, json!(1), None);
    tokio::time::advance(Duration::from_millis(10)).await;
    cache.set(&k2, 0.0, json!(2), None);
    tokio::time::advance(Duration::from_millis(10)).await;
    cache.set(&k3, 0.0, json!(3), None);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&k1, 0.0, None), None);
    assert_eq!(cache.get(&k2, 0.0, None), Some(json!(2)));
    assert_eq!(cache.get(&k3, 0.0, None), Some(json!(3)));
}

#[tokio::test]
async fn schema_declaration_order_does_not_affect_the_key() {
    let cache = ResponseCache::new(CacheConfig::default());
    let msgs = messages("hello");
    let forward = Schema::object()
        .property("x", Schema::string())
        .property("y", Schema::number());
    let backward = Schema::object()
        .property("y", Schema::number())
        .property("x", Schema::string());

    cache.set(&msgs, 0.0, json!("value"), Some(&forward));
    assert_eq!(
        cache.get(&msgs, 0.0, Some(&backward)),
        Some(json!("value"))
    );
}

#[tokio::test]
async fn different_schemas_miss_against_each_other() {
    let cache = ResponseCache::new(CacheConfig::default());
    let msgs = messages("hello");
    let a = Schema::object().property("x", Schema::string());
    let b = Schema::object().property("x", Schema::number());

    cache.set(&msgs, 0.0, json!("value"), Some(&a));
    assert_eq!(cache.get(&msgs, 0.0, Some(&b)), None);
}

#[tokio::test]
async fn disabled_cache_never_returns_a_value() {
    let cache = ResponseCache::new(CacheConfig::disabled());
    let msgs = messages("hello");

    cache.set(&msgs, 0.0, json!("value"), None);
    assert_eq!(cache.get(&msgs, 0.0, None), None);
    assert_eq!(cache.len(), 0);
}

#[tokio::test]
async fn hit_and_miss_counters_are_emitted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let cache = ResponseCache::new(CacheConfig::default());
        let msgs = messages("hello");
        assert!(cache.get(&msgs, 0.0, None).is_none());
        cache.set(&msgs, 0.0, json!(1), None);
        assert!(cache.get(&msgs, 0.0, None).is_some());
    });

    let counter = |name: &str| {
        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .find(|(key, ..)| key.key().name() == name)
            .map(|(.., value)| match value {
                DebugValue::Counter(n) => n,
                other => panic!("expected counter, got {other:?}"),
            })
    };
    assert_eq!(counter("huginn_cache_misses_total"), Some(1));
    assert_eq!(counter("huginn_cache_hits_total"), Some(1));
}

#[tokio::test]
async fn clear_empties_all_entries() {
    let cache = ResponseCache::new(CacheConfig::default());
    let k1 = messages("one");
    let k2 = messages("two");

    cache.set(&k1, 0.0, json!(1), None);
    cache.set(&k2, 0.0, json!(2), None);
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.get(&k1, 0.0, None), None);
    assert_eq!(cache.get(&k2, 0.0, None), None);
}
