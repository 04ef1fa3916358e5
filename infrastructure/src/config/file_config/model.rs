//! Model configuration from TOML (`[model]` section)

use mods_domain::context::DEFAULT_TOKEN_LIMIT;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Base URL of the API (the `/v1/chat/completions` path is appended).
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Direct API key; the environment variable is preferred.
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// Estimated-token budget for whole-document speaker context.
    pub token_limit: usize,
    pub timeout_seconds: u64,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key_env: "MODS_API_KEY".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            token_limit: DEFAULT_TOKEN_LIMIT,
            timeout_seconds: 120,
        }
    }
}

impl FileModelConfig {
    /// The API key from `api_key_env`, falling back to `api_key`.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }
}
