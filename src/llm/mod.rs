//! Completion providers the relay forwards chat turns to.

pub mod errors;
pub mod openai;
pub mod provider;

pub use errors::{LlmError, LlmResult};
pub use openai::{DEFAULT_OPENAI_BASE_URL, OpenAiClient};
pub use provider::CompletionProvider;
