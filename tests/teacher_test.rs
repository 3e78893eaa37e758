//! Tests for the teacher's fallback contract and provider requests.

use axum::extract::State;
use axum::{Json, Router};
use prime_lock::{
    ExplanationClient, FALLBACK_NETWORK, FALLBACK_NO_CREDENTIALS, FALLBACK_THINKING, LlmClient,
    LlmConfig, LlmProvider, TeacherClient,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Captured = Arc<Mutex<Vec<Value>>>;

/// Starts a local server that answers every POST with `reply` and records bodies.
async fn mock_llm(reply: Value) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .fallback(
            |State((reply, captured)): State<(Value, Captured)>, Json(body): Json<Value>| async move {
                captured.lock().expect("capture lock").push(body);
                Json(reply)
            },
        )
        .with_state((reply, captured.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    (format!("http://{addr}"), captured)
}

fn teacher(provider: LlmProvider, base_url: &str, timeout: Duration) -> TeacherClient {
    let config = LlmConfig::new(provider, "test-key".to_string(), "test-model".to_string(), 64)
        .with_base_url(base_url);
    TeacherClient::new(Some(LlmClient::new(config)), timeout)
}

#[tokio::test]
async fn test_missing_credentials_fall_back() {
    let teacher = TeacherClient::offline();
    assert!(!teacher.is_online());
    assert_eq!(
        teacher.explain_concept("Why is P=1 hard?", "prime lock").await,
        FALLBACK_NO_CREDENTIALS
    );
    assert_eq!(teacher.code_snippet_explanation().await, "");
}

#[tokio::test]
async fn test_transport_failure_falls_back() {
    // Nothing listens on the discard port
    let teacher = teacher(LlmProvider::Gemini, "http://127.0.0.1:9", Duration::from_secs(5));
    assert_eq!(teacher.explain_concept("topic", "context").await, FALLBACK_NETWORK);
    assert_eq!(teacher.code_snippet_explanation().await, "");
}

#[tokio::test]
async fn test_hanging_server_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind silent server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let teacher = teacher(
        LlmProvider::Anthropic,
        &format!("http://{addr}"),
        Duration::from_millis(200),
    );
    assert_eq!(teacher.explain_concept("topic", "context").await, FALLBACK_NETWORK);
}

#[tokio::test]
async fn test_gemini_reply_is_returned() {
    let (base_url, captured) = mock_llm(json!({
        "candidates": [{
            "content": { "parts": [{ "text": "Primes are smooth iron balls!" }] }
        }]
    }))
    .await;

    let teacher = teacher(LlmProvider::Gemini, &base_url, Duration::from_secs(5));
    let reply = teacher
        .explain_concept("Why is P=1 hard?", "The password was 17")
        .await;
    assert_eq!(reply, "Primes are smooth iron balls!");

    let bodies = captured.lock().expect("capture lock");
    assert_eq!(bodies.len(), 1);
    let user_text = bodies[0]["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("user text");
    assert!(user_text.contains("The password was 17"));
    assert!(user_text.contains("Why is P=1 hard?"));
    assert!(bodies[0]["system_instruction"]["parts"][0]["text"]
        .as_str()
        .is_some_and(|s| s.contains("80 words")));
}

#[tokio::test]
async fn test_empty_reply_falls_back_to_thinking() {
    let (base_url, _captured) = mock_llm(json!({
        "candidates": [{ "content": { "parts": [{ "text": "  " }] } }]
    }))
    .await;

    let teacher = teacher(LlmProvider::Gemini, &base_url, Duration::from_secs(5));
    assert_eq!(teacher.explain_concept("topic", "context").await, FALLBACK_THINKING);
}

#[tokio::test]
async fn test_partless_gemini_candidate_falls_back_to_thinking() {
    let (base_url, _captured) = mock_llm(json!({
        "candidates": [{ "content": { "role": "model" }, "finishReason": "MAX_TOKENS" }]
    }))
    .await;

    let teacher = teacher(LlmProvider::Gemini, &base_url, Duration::from_secs(5));
    assert_eq!(teacher.explain_concept("topic", "context").await, FALLBACK_THINKING);
}

#[tokio::test]
async fn test_gemini_without_candidates_falls_back_to_thinking() {
    let (base_url, _captured) = mock_llm(json!({ "promptFeedback": {} })).await;

    let teacher = teacher(LlmProvider::Gemini, &base_url, Duration::from_secs(5));
    assert_eq!(teacher.explain_concept("topic", "context").await, FALLBACK_THINKING);
}

#[tokio::test]
async fn test_malformed_reply_falls_back_to_network() {
    let (base_url, _captured) = mock_llm(json!({ "unexpected": true })).await;

    let teacher = teacher(LlmProvider::Anthropic, &base_url, Duration::from_secs(5));
    assert_eq!(teacher.explain_concept("topic", "context").await, FALLBACK_NETWORK);
}

#[tokio::test]
async fn test_anthropic_code_notes() {
    let (base_url, captured) = mock_llm(json!({
        "content": [{ "type": "text", "text": "```cpp\nbool is_prime(int n);\n```" }]
    }))
    .await;

    let teacher = teacher(LlmProvider::Anthropic, &base_url, Duration::from_secs(5));
    let notes = teacher.code_snippet_explanation().await;
    assert!(notes.contains("is_prime"));

    let bodies = captured.lock().expect("capture lock");
    assert_eq!(bodies[0]["model"], "test-model");
    assert_eq!(bodies[0]["max_tokens"], 64);
}
