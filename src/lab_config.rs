//! Lab configuration: teacher LLM settings and game timing.

use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the lock lab.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct LabConfig {
    /// LLM provider behind the teacher (gemini, openai or anthropic).
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// LLM model name (e.g., "gemini-2.5-flash", "gpt-4o-mini").
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// Optional API host override.
    #[serde(default)]
    llm_base_url: Option<String>,

    /// Upper bound on a single teacher request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Artificial "scanning" delay before the guess space is shown, in milliseconds.
    #[serde(default = "default_scan_delay_ms")]
    scan_delay_ms: u64,
}

fn default_provider() -> LlmProvider {
    LlmProvider::Gemini
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_scan_delay_ms() -> u64 {
    1000
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            llm_provider: default_provider(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
            llm_base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            scan_delay_ms: default_scan_delay_ms(),
        }
    }
}

impl LabConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(provider = %config.llm_provider, model = %config.llm_model, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the LLM provider.
    pub fn with_provider(mut self, provider: LlmProvider, model: impl Into<String>) -> Self {
        self.llm_provider = provider;
        self.llm_model = model.into();
        self
    }

    /// Overrides the API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.llm_base_url = Some(base_url.into());
        self
    }

    /// Overrides the scan delay.
    pub fn with_scan_delay(mut self, delay: Duration) -> Self {
        self.scan_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Scan delay as a duration.
    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scan_delay_ms)
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Environment variables consulted for this provider's API key, in order.
    pub fn credential_vars(&self) -> &'static [&'static str] {
        match self.llm_provider {
            LlmProvider::Gemini => &["GEMINI_API_KEY", "API_KEY"],
            LlmProvider::OpenAI => &["OPENAI_API_KEY"],
            LlmProvider::Anthropic => &["ANTHROPIC_API_KEY"],
        }
    }

    /// Creates LLM configuration, reading the API key from the environment.
    #[instrument(skip(self), fields(provider = ?self.llm_provider, model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let vars = self.credential_vars();
        let api_key = vars
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|key| !key.trim().is_empty()))
            .ok_or_else(|| {
                ConfigError::new(format!("{} environment variable not set", vars.join(" or ")))
            })?;
        self.create_llm_config_with_key(api_key)
    }

    /// Creates LLM configuration with an explicit API key.
    #[instrument(skip(self, api_key))]
    pub fn create_llm_config_with_key(&self, api_key: String) -> Result<LlmConfig, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::new("API key is empty".to_string()));
        }

        let config = LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        );
        Ok(match &self.llm_base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
