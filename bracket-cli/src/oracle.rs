//! Shared oracle and round flags
//!
//! Every command that judges candidates takes the same flags. Values resolve
//! flag first, then config file, then built-in default.

use std::time::Duration;

use clap::Args;

use bracket_llm::{LlmConfig, LlmOracle};
use bracket_tournament::RoundConfig;

use crate::config::FileConfig;

#[derive(Args, Clone, Debug, Default)]
pub struct OracleArgs {
    /// OpenAI-compatible API endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model ID
    #[arg(long)]
    pub model: Option<String>,

    /// API key (defaults to BRACKET_API_KEY, then OPENAI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extra attempts after a retryable failure
    #[arg(long)]
    pub retries: Option<usize>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f64>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct RoundArgs {
    /// Pairs per oracle call (must be even)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Role the candidates are judged for
    #[arg(long)]
    pub role: Option<String>,

    /// Batches judged at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Delay between sequential batches, in milliseconds
    #[arg(long, default_value = "0")]
    pub delay_ms: u64,
}

/// Build the LLM oracle from flags and config file
pub fn build_oracle(args: &OracleArgs, file: &FileConfig) -> LlmOracle {
    let config = llm_config(args, file, resolve_api_key(args.api_key.clone()));

    if config.api_key.is_none() {
        tracing::warn!("No API key set; requests to {} will be unauthenticated", config.endpoint);
    }
    tracing::info!("Using model {} at {}", config.model, config.endpoint);

    LlmOracle::new(config)
}

/// Merge flags over file values over defaults
pub fn llm_config(args: &OracleArgs, file: &FileConfig, api_key: Option<String>) -> LlmConfig {
    let defaults = LlmConfig::default();

    let mut config = LlmConfig::default()
        .with_endpoint(pick(args.endpoint.clone(), file.endpoint.clone(), defaults.endpoint))
        .with_model(pick(args.model.clone(), file.model.clone(), defaults.model))
        .with_api_key(api_key)
        .with_timeout(Duration::from_secs(pick(
            args.timeout,
            file.timeout_secs,
            defaults.timeout.as_secs(),
        )))
        .with_retries(
            pick(args.retries, file.max_retries, defaults.max_retries),
            defaults.retry_delay,
        );

    if let Some(temperature) = args.temperature.or(file.temperature) {
        config = config.with_temperature(temperature);
    }
    config
}

/// Merge round flags over file values over defaults
pub fn round_config(args: &RoundArgs, file: &FileConfig) -> RoundConfig {
    let defaults = RoundConfig::default();

    RoundConfig::default()
        .with_batch_size(pick(args.batch_size, file.batch_size, defaults.batch_size))
        .with_role(pick(args.role.clone(), file.role.clone(), defaults.role))
        .with_concurrency(pick(args.concurrency, file.concurrency, defaults.max_concurrency))
        .with_batch_delay(Duration::from_millis(args.delay_ms))
}

/// API key from the flag or the environment
fn resolve_api_key(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var("BRACKET_API_KEY").ok())
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .filter(|key| !key.is_empty())
}

fn pick<T>(flag: Option<T>, file: Option<T>, default: T) -> T {
    flag.or(file).unwrap_or(default)
}
