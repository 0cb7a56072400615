//! Configuration schema for advisor.toml.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides `model_api_key`.
pub const API_KEY_ENV: &str = "MODEL_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Base URL of the OpenAI-compatible inference API.
    pub model_api_url: String,

    /// API key for the inference API.
    pub model_api_key: String,

    /// Inference model for the advice loop.
    pub model: String,

    /// Maximum tokens per model response.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f64,

    /// Maximum model round-trips per advice request.
    pub max_rounds: u32,

    /// Timeout for a single model call, in seconds.
    pub model_timeout_secs: u64,

    /// Timeout for a single tool run, in seconds.
    pub tool_timeout_secs: u64,

    /// Number of career records retrieved as prompt context.
    pub context_limit: usize,

    /// Study hours per week assumed when the model does not say.
    pub hours_per_week_default: f64,

    /// Path to SQLite database.
    pub db_path: String,

    /// Address the HTTP service binds to.
    pub bind_address: String,

    /// Log level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model_api_url: "https://api.openai.com".into(),
            model_api_key: String::new(),
            model: "gpt-4o".into(),
            max_tokens: 4096,
            temperature: 0.7,
            max_rounds: 10,
            model_timeout_secs: 120,
            tool_timeout_secs: 10,
            context_limit: 3,
            hours_per_week_default: 10.0,
            db_path: "~/.career-advisor/advisor.db".into(),
            bind_address: "127.0.0.1:3000".into(),
            log_level: "info".into(),
        }
    }
}

impl AdvisorConfig {
    /// Resolve a path that may contain `~` to an absolute path.
    pub fn resolve_path(&self, path: &str) -> String {
        shellexpand::tilde(path).into_owned()
    }

    /// Resolved database path.
    pub fn resolved_db_path(&self) -> String {
        self.resolve_path(&self.db_path)
    }

    /// Replace the API key with `MODEL_API_KEY` when that is set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.model_api_key = key;
            }
        }
    }
}
