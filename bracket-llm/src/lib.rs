//! BRACKET LLM - OpenAI-compatible oracle backend
//!
//! Sends each batch prompt to a chat-completions endpoint and hands the reply
//! text back to the engine:
//! - `config`: endpoint, model, credentials, timeout and retry settings
//! - `client`: the [`LlmOracle`] implementing `bracket_tournament::Oracle`
//! - `think`: removal of `<think>` sections emitted by reasoning models

mod client;
mod config;
mod think;

pub use client::LlmOracle;
pub use config::{LlmConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use think::strip_thinking;
