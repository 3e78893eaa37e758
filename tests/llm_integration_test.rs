//! Live connectivity tests against real providers.

use prime_lock::{LlmClient, LlmConfig, LlmProvider};
use tracing::instrument;

async fn say_hello(provider: LlmProvider, key_var: &str, model: &str) {
    dotenvy::dotenv().ok();

    let api_key = std::env::var(key_var).unwrap_or_else(|_| panic!("{key_var} not set"));
    let client = LlmClient::new(LlmConfig::new(provider, api_key, model.to_string(), 256));

    let response = client
        .generate("You are a helpful assistant.", "Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_gemini_connectivity() {
    say_hello(LlmProvider::Gemini, "GEMINI_API_KEY", "gemini-2.5-flash").await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_connectivity() {
    say_hello(LlmProvider::Anthropic, "ANTHROPIC_API_KEY", "claude-3-5-haiku-20241022").await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_connectivity() {
    say_hello(LlmProvider::OpenAI, "OPENAI_API_KEY", "gpt-4o-mini").await;
}
