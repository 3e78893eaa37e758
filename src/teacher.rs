//! The AI teacher that explains round outcomes.
//!
//! Every call resolves to a displayable string. Missing credentials,
//! transport failures, timeouts and empty replies all map to fixed fallback
//! text, so callers never have to handle an error.

use crate::lab_config::LabConfig;
use crate::llm_client::LlmClient;
use async_trait::async_trait;
use prime_lock_core::{LockMode, Round};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Shown when no API key is configured.
pub const FALLBACK_NO_CREDENTIALS: &str =
    "The teacher is taking a break, please try again later. (Missing API key)";

/// Shown when the request fails or times out.
pub const FALLBACK_NETWORK: &str = "The teacher's network is a bit slow, please check the connection.";

/// Shown when the model replies with nothing.
pub const FALLBACK_THINKING: &str = "The teacher is thinking...";

const TEACHER_PROMPT: &str = "\
You are a warm, funny C++ programming teacher explaining prime numbers and \
cryptography to third-grade students.

Explain in extremely simple, playful language.

Core ideas (always include them):
1. A composite number is like a building block covered in handles and cracks. \
A hacker can grab its factors and work out which number it is, so it makes a \
fragile password.
2. A prime number is a smooth iron ball. Apart from 1 and itself it has no \
factors at all, so the hacker has nothing to grab. Primes are the strongest \
password material.

Rules:
1. Keep it under 80 words.
2. Be encouraging and praise the student.";

const SNIPPET_SYSTEM_PROMPT: &str = "You are a C++ teacher writing short notes for children.";

const SNIPPET_PROMPT: &str = "\
Write a short C++ program that checks whether a number is prime using trial \
division. Add comments explaining that if the number divides evenly, it is \
not prime (it has a weakness). Wrap the code in a markdown code block.";

/// Source of explanation text for the game.
#[async_trait]
pub trait ExplanationClient: Send + Sync {
    /// Explains `topic` given what just happened in the game.
    async fn explain_concept(&self, topic: &str, context: &str) -> String;

    /// Returns decorative code notes; empty when unavailable.
    async fn code_snippet_explanation(&self) -> String;
}

/// Question and situation sent to the teacher after a round is solved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipRequest {
    /// What the student is asking about.
    pub topic: String,
    /// What happened in the round.
    pub context: String,
}

impl TipRequest {
    /// Describes a solved round for the teacher.
    #[instrument(skip(round), fields(mode = %round.mode()))]
    pub fn for_round(round: &Round) -> Self {
        let candidates = round.guess_space().len();
        match round.mode() {
            LockMode::Composite => Self {
                topic: "Why does knowing the public key P make N easy to guess?".to_string(),
                context: format!(
                    "The password was the composite number {}. Because we knew the public key P={}, \
                     only a few tries were needed ({} candidates). Composite numbers are not safe!",
                    round.secret(),
                    round.public_factor(),
                    candidates
                ),
            },
            LockMode::Prime => Self {
                topic: "Why is N so hard to guess when the public key is P=1?".to_string(),
                context: format!(
                    "The password was the prime number {}. The public key was P={}, so we had to \
                     guess blindly among {} candidates. Prime numbers are very safe!",
                    round.secret(),
                    round.public_factor(),
                    candidates
                ),
            },
        }
    }
}

/// LLM-backed [`ExplanationClient`].
///
/// Built without an LLM client when credentials are missing; in that state it
/// answers every request with the fallback text.
#[derive(Debug, Clone)]
pub struct TeacherClient {
    llm: Option<LlmClient>,
    timeout: Duration,
}

impl TeacherClient {
    /// Creates a teacher from lab configuration, reading credentials from the environment.
    #[instrument(skip(config), fields(provider = %config.llm_provider()))]
    pub fn from_config(config: &LabConfig) -> Self {
        match config.create_llm_config() {
            Ok(llm_config) => Self::new(Some(LlmClient::new(llm_config)), config.request_timeout()),
            Err(e) => {
                warn!(error = %e, "Teacher has no credentials, using fallback text");
                Self::new(None, config.request_timeout())
            }
        }
    }

    /// Creates a teacher around an optional LLM client.
    pub fn new(llm: Option<LlmClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// A teacher with no LLM, answering only with fallback text.
    pub fn offline() -> Self {
        Self::new(None, Duration::from_secs(1))
    }

    /// Returns true if an LLM client is configured.
    pub fn is_online(&self) -> bool {
        self.llm.is_some()
    }

    /// Runs one completion, bounded by the request timeout.
    async fn ask(&self, llm: &LlmClient, system: &str, user: &str) -> Option<String> {
        match tokio::time::timeout(self.timeout, llm.generate(system, user)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                warn!(error = %e, "Teacher request failed");
                None
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "Teacher request timed out");
                None
            }
        }
    }
}

#[async_trait]
impl ExplanationClient for TeacherClient {
    #[instrument(skip(self, context))]
    async fn explain_concept(&self, topic: &str, context: &str) -> String {
        let Some(llm) = &self.llm else {
            return FALLBACK_NO_CREDENTIALS.to_string();
        };

        let message = format!("Current situation: {}\nStudent action: {}", context, topic);
        match self.ask(llm, TEACHER_PROMPT, &message).await {
            Some(text) if !text.trim().is_empty() => {
                info!(length = text.len(), "Teacher explained concept");
                text
            }
            Some(_) => {
                debug!("Teacher returned an empty reply");
                FALLBACK_THINKING.to_string()
            }
            None => FALLBACK_NETWORK.to_string(),
        }
    }

    #[instrument(skip(self))]
    async fn code_snippet_explanation(&self) -> String {
        let Some(llm) = &self.llm else {
            return String::new();
        };
        self.ask(llm, SNIPPET_SYSTEM_PROMPT, SNIPPET_PROMPT)
            .await
            .unwrap_or_default()
    }
}
