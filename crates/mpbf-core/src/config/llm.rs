//! LLM completion endpoint configuration.

use serde::{Deserialize, Serialize};

/// Settings for the outbound LLM completion client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat-completions endpoint URL (OpenAI-compatible).
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key. Prefer the `MPBF_LLM_API_KEY` environment variable over
    /// putting this in the file.
    #[serde(default)]
    pub api_key: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature. Low for consistent structured output.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP client timeout in seconds. The pipeline imposes no deadline
    /// of its own beyond this.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    800
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}
