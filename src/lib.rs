//! Prime Lock Lab - a guessing game about prime and composite keys
//!
//! A secret password `N` is locked away and a public key `P` leaks to the
//! player. Composite locks leak a big factor, so only a handful of multiples
//! need checking; prime locks can only leak `P = 1`, which forces a blind
//! search. After the lock opens, an LLM teacher explains why.
//!
//! # Architecture
//!
//! - **Core** (`prime_lock_core`): lock generation and guess evaluation
//! - **Session**: owns the active round, the scan delay and the teacher request
//! - **Teacher**: LLM-backed explanations with fixed fallbacks (Gemini, OpenAI, Anthropic)
//! - **Frontends**: terminal UI and HTTP JSON API
//!
//! # Example
//!
//! ```no_run
//! use prime_lock::{LabConfig, LabSession, LockMode, TeacherClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = LabConfig::load_or_default("prime_lock.toml")?;
//! let teacher = Arc::new(TeacherClient::from_config(&config));
//! let session = LabSession::new(teacher, &config);
//!
//! session.start_round(LockMode::Prime);
//! println!("{:?}", session.snapshot().phase);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod lab_config;
mod llm_client;
mod server;
mod session;
mod teacher;
mod tui;

// Crate-level exports - Core game types
pub use prime_lock_core::{
    GUESS_CEILING, GuessOutcome, GuessSpace, LOCK_PRIMES, LockGenerator, LockMode, PUBLIC_FACTORS,
    Round, RoundError, evaluate, generate,
};

// Crate-level exports - Configuration
pub use lab_config::{ConfigError, LabConfig};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Teacher
pub use teacher::{
    ExplanationClient, FALLBACK_NETWORK, FALLBACK_NO_CREDENTIALS, FALLBACK_THINKING, TeacherClient,
    TipRequest,
};

// Crate-level exports - Session management
pub use session::{GuessRejected, LabSession, LabSnapshot, LastGuess, RoundId, RoundPhase, TipState};

// Crate-level exports - Frontends
pub use server::{CodeNotesResponse, ErrorResponse, GuessRequest, GuessResponse, StartRoundRequest, router, serve};
pub use tui::{App, run_tui};
