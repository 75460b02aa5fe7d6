//! OpenAI-compatible backend against a mock HTTP server

use ideaval_agent::{CompletionRequest, LlmBackend, LlmError, OpenAiBackend};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> OpenAiBackend {
    OpenAiBackend::new(format!("{}/v1", server.uri()), "default-model", Some("sk-test".to_string()))
        .expect("client builds")
}

#[tokio::test]
async fn test_completion_passes_model_and_temperature() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "architect-model",
            "temperature": 0.0,
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "{\"ok\": true}"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = backend_for(&server)
        .complete(
            CompletionRequest::user("Normalize this idea")
                .with_model("architect-model")
                .with_temperature(0.0),
        )
        .await
        .expect("completion succeeds");

    assert_eq!(response.content, "{\"ok\": true}");
    assert_eq!(response.usage.total(), 16);
}

#[tokio::test]
async fn test_default_model_used_when_unset() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "default-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "hello"}, "finish_reason": null}]
        })))
        .mount(&server)
        .await;

    let response = backend_for(&server)
        .complete(CompletionRequest::user("Hi"))
        .await
        .expect("completion succeeds");

    assert_eq!(response.content, "hello");
    assert_eq!(response.usage.total(), 0);
}

#[tokio::test]
async fn test_unauthorized_maps_to_distinct_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .complete(CompletionRequest::user("Hi"))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Authentication failed: invalid api key");
}

#[tokio::test]
async fn test_rate_limit_and_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "busy"})))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "broken"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);

    let err = backend
        .complete(CompletionRequest::user("Hi").with_model("busy"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::RateLimited { retry_after_ms: Some(2000) }));

    let err = backend
        .complete(CompletionRequest::user("Hi").with_model("broken"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::RequestFailed(ref m) if m.contains("boom")));
}

#[tokio::test]
async fn test_empty_choices_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .complete(CompletionRequest::user("Hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::ParseError(_)));
}
