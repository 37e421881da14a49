//! Chat-completions client

use std::sync::OnceLock;
use std::thread;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use bracket_tournament::{BatchRequest, Oracle, OracleError};

use crate::config::LlmConfig;
use crate::think::strip_thinking;

/// Longest error body kept in an `OracleError::Status`
const MAX_ERROR_BODY: usize = 200;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: Option<String>,
}

/// Oracle backed by an OpenAI-compatible endpoint
pub struct LlmOracle {
    config: LlmConfig,
    /// Built on first call; a blocking client must not be created on an
    /// async worker thread
    client: OnceLock<Client>,
}

impl LlmOracle {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn client(&self) -> Result<&Client, OracleError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| OracleError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(self.client.get_or_init(|| client))
    }

    /// One HTTP round trip
    fn send(&self, prompt: &str) -> Result<String, OracleError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let mut builder = self.client()?.post(self.config.completions_url()).json(&body);
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let data: ChatCompletionResponse = response
            .json()
            .map_err(|e| OracleError::Decode(e.to_string()))?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(OracleError::EmptyReply)?;

        let (answer, thinking) = strip_thinking(&content);
        if let Some(thinking) = thinking {
            tracing::debug!(thinking = %thinking, "model reasoning");
        }
        if answer.is_empty() {
            return Err(OracleError::EmptyReply);
        }
        Ok(answer.to_string())
    }

    fn transport_error(&self, e: reqwest::Error) -> OracleError {
        if e.is_timeout() {
            OracleError::Timeout(self.config.timeout)
        } else {
            OracleError::Unavailable(e.to_string())
        }
    }
}

impl Oracle for LlmOracle {
    fn judge(&self, request: &BatchRequest) -> Result<String, OracleError> {
        tracing::debug!(batch = request.batch_index, prompt = %request.prompt, "sending prompt");

        let mut attempt = 0;
        loop {
            match self.send(&request.prompt) {
                Ok(answer) => return Ok(answer),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        batch = request.batch_index,
                        "LLM request failed ({e}), retry {attempt}/{}",
                        self.config.max_retries
                    );
                    thread::sleep(self.config.retry_delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
