//! LLM endpoint configuration

use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.cerebras.ai";
pub const DEFAULT_MODEL: &str = "qwen-3-32b";

/// Configuration for the chat-completions endpoint
#[derive(Clone, Debug, PartialEq)]
pub struct LlmConfig {
    /// Base URL; `/v1/chat/completions` is appended
    pub endpoint: String,
    pub model: String,
    /// Sent as a bearer token when set
    pub api_key: Option<String>,
    /// Omitted from the request when unset
    pub temperature: Option<f64>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Extra attempts after a retryable failure
    pub max_retries: usize,
    pub retry_delay: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: None,
            timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl LlmConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: usize, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Full chat-completions URL
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}
