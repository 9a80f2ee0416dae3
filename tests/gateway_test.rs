use huginn::{CacheConfig, Huginn, HuginnError, Message, Schema};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_reply(content: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

fn gemini_reply(text: &str) -> Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]})
}

fn prompt() -> Vec<Message> {
    vec![
        Message::system("You generate configs."),
        Message::user("Generate the config."),
    ]
}

#[tokio::test]
async fn openai_structured_call_round_trips() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": {"type": "json_schema"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(r#"{"name": "orders"}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Huginn::builder()
        .openai("sk-test")
        .model("gpt-4o-mini")
        .base_url(server.uri())
        .build()
        .unwrap();

    let schema = Schema::object().property("name", Schema::string());
    let messages = prompt();
    let output = gateway.generate_object(&messages, &schema, 0.0).await.unwrap();

    assert_eq!(output.response, json!({"name": "orders"}));
    // input history untouched, reply appended to the returned copy
    assert_eq!(messages.len(), 2);
    assert_eq!(output.messages.len(), 3);
}

#[tokio::test]
async fn deterministic_call_is_served_from_cache_on_repeat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(r#"{"name": "orders"}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Huginn::builder()
        .openai("sk-test")
        .model("gpt-4o-mini")
        .base_url(server.uri())
        .build()
        .unwrap();

    let schema = Schema::object().property("name", Schema::string());
    let first = gateway.generate_object(&prompt(), &schema, 0.0).await.unwrap();
    let second = gateway.generate_object(&prompt(), &schema, 0.0).await.unwrap();

    assert_eq!(first.response, second.response);
    assert_eq!(second.messages.len(), 3);
    assert_eq!(gateway.cache().len(), 1);
}

#[tokio::test]
async fn non_deterministic_call_bypasses_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(r#"{"name": "orders"}"#)))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = Huginn::builder()
        .openai("sk-test")
        .model("gpt-4o-mini")
        .base_url(server.uri())
        .build()
        .unwrap();

    let schema = Schema::object().property("name", Schema::string());
    gateway.generate_object(&prompt(), &schema, 0.7).await.unwrap();
    gateway.generate_object(&prompt(), &schema, 0.7).await.unwrap();
    assert_eq!(gateway.cache().len(), 0);
}

#[tokio::test]
async fn disabled_cache_always_dispatches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("hello")))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = Huginn::builder()
        .openai("sk-test")
        .model("gpt-4o-mini")
        .base_url(server.uri())
        .cache(CacheConfig::disabled())
        .build()
        .unwrap();

    gateway.generate_text(&prompt(), 0.0).await.unwrap();
    gateway.generate_text(&prompt(), 0.0).await.unwrap();
}

#[tokio::test]
async fn requests_carry_the_temporal_anchor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Current date: "))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("hello")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Huginn::builder()
        .openai("sk-test")
        .model("gpt-4o-mini")
        .base_url(server.uri())
        .build()
        .unwrap();

    let output = gateway.generate_text(&prompt(), 0.0).await.unwrap();
    assert_eq!(output.response, "hello");
    // the anchor is a dispatch concern; the returned history has no trace of it
    assert!(!output.messages[0].content.contains("Current date"));
}

#[tokio::test]
async fn non_object_root_is_wrapped_and_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        // strict mode requires an object root, so the array schema travels wrapped
        .and(body_string_contains("\"value\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_reply(r#"{"value": ["a", "b"]}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Huginn::builder()
        .openai("sk-test")
        .model("gpt-4o-mini")
        .base_url(server.uri())
        .build()
        .unwrap();

    let schema = Schema::array(Schema::string());
    let output = gateway.generate_object(&prompt(), &schema, 0.0).await.unwrap();
    assert_eq!(output.response, json!(["a", "b"]));
}

#[tokio::test]
async fn gemini_structured_call_round_trips() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "g-test"))
        .and(body_partial_json(json!({
            "generationConfig": {"responseMimeType": "application/json"},
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gemini_reply(r#"{"name": "orders"}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Huginn::builder()
        .gemini("g-test")
        .model("gemini-2.0-flash")
        .base_url(server.uri())
        .build()
        .unwrap();

    let schema = Schema::object().property("name", Schema::string());
    let output = gateway.generate_object(&prompt(), &schema, 0.0).await.unwrap();
    assert_eq!(output.response, json!({"name": "orders"}));
}

#[tokio::test]
async fn prose_around_the_payload_is_stripped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            "Here is the config you asked for:\n```json\n{\"name\": \"orders\"}\n```",
        )))
        .mount(&server)
        .await;

    let gateway = Huginn::builder()
        .gemini("g-test")
        .model("gemini-2.0-flash")
        .base_url(server.uri())
        .build()
        .unwrap();

    let schema = Schema::object().property("name", Schema::string());
    let output = gateway.generate_object(&prompt(), &schema, 0.0).await.unwrap();
    assert_eq!(output.response, json!({"name": "orders"}));
}

#[tokio::test]
async fn unparseable_reply_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openai_reply("I cannot help with that.")),
        )
        .mount(&server)
        .await;

    let gateway = Huginn::builder()
        .openai("sk-test")
        .model("gpt-4o-mini")
        .base_url(server.uri())
        .build()
        .unwrap();

    let schema = Schema::object().property("name", Schema::string());
    let err = gateway
        .generate_object(&prompt(), &schema, 0.0)
        .await
        .unwrap_err();
    assert!(matches!(err, HuginnError::Parse(_)));
    // failures are never cached
    assert_eq!(gateway.cache().len(), 0);
}

#[tokio::test]
async fn http_status_maps_to_error_taxonomy() {
    let cases: [(u16, fn(&HuginnError) -> bool); 3] = [
        (401, |e| matches!(e, HuginnError::AuthenticationFailed)),
        (429, |e| matches!(e, HuginnError::RateLimited)),
        (500, |e| matches!(e, HuginnError::Api { status: 500, .. })),
    ];
    for (status, check) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string("vendor error"))
            .mount(&server)
            .await;

        let gateway = Huginn::builder()
            .openai("sk-test")
            .model("gpt-4o-mini")
            .base_url(server.uri())
            .build()
            .unwrap();

        let err = gateway.generate_text(&prompt(), 0.0).await.unwrap_err();
        assert!(check(&err), "status {status} mapped to {err:?}");
    }
}

#[tokio::test]
async fn text_and_object_calls_use_distinct_cache_keys() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(r#"{"n": 1}"#)))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = Huginn::builder()
        .openai("sk-test")
        .model("gpt-4o-mini")
        .base_url(server.uri())
        .build()
        .unwrap();

    let schema = Schema::object().property("n", Schema::integer());
    gateway.generate_object(&prompt(), &schema, 0.0).await.unwrap();
    gateway.generate_text(&prompt(), 0.0).await.unwrap();
    assert_eq!(gateway.cache().len(), 2);
}
