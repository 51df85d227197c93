//! Completion provider abstraction.

use async_trait::async_trait;

use crate::conversation::Message;

use super::errors::LlmResult;

/// External service producing the next message of a conversation.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate one reply for the given context window.
    ///
    /// # Errors
    /// Returns an error if the provider is unreachable, times out, rejects the
    /// request or answers with an unusable result.
    async fn complete(&self, model: &str, messages: &[Message]) -> LlmResult<Message>;
}
